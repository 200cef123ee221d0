// Application layer: concrete pipelines wiring the harvester to storage.

pub mod pipelines;
