pub mod common;
pub mod naming;
pub mod replica;

pub use common::{
    owner_reference, replica_labels, standard_labels, API_VERSION, FIELD_MANAGER, KIND,
};
pub use naming::{RandomSuffixes, SuffixSource, SUFFIX_LEN};
