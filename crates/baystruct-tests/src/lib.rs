//! Integration test harness for `baystruct-core`. All tests live under `tests/`.
