pub mod case_graph;
pub mod not_found;
