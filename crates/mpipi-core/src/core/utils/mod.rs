pub mod cell_list;
pub mod geometry;
