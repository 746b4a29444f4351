mod confirming_set;

pub use confirming_set::{
    CementedNotification, ConfirmingSet, ConfirmingSetConfig, ConfirmingSetExt,
};
