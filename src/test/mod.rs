pub(crate) use crate::test_fixtures as factories;
