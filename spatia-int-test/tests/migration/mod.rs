mod migration_test;
