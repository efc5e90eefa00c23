mod tests_table;
