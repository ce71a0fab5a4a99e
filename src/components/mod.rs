pub mod alert;
pub mod case_graph;
