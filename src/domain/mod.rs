pub mod model;
pub mod graph;
pub mod resolver;
pub mod coupling;
pub mod cluster;
pub mod modules;
pub mod ports;
