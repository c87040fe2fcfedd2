mod asset_test;
mod lifecycle_test;
