// Domain layer: review models, element locators and the ports the harvester drives.

pub mod locator;
pub mod model;
pub mod ports;
