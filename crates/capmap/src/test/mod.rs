pub mod test_field_table;
pub mod test_mapper;
