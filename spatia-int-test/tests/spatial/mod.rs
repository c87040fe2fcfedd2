mod spatial_test;
