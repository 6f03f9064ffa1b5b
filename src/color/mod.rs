pub(crate) mod assigner;
