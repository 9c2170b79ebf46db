pub mod path_row;
