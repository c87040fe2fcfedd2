mod builder_test;
