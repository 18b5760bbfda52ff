use core::slice;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{NodeId, PublicKey};

/// A validator is a node id and the public key it signs with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// The replica's identity.
    pub id: NodeId,

    /// The replica's signing key.
    pub public_key: PublicKey,
}

impl Validator {
    /// Create a new validator.
    pub fn new(id: NodeId, public_key: PublicKey) -> Self {
        Self { id, public_key }
    }
}

/// The full membership of the replica group, sorted by node id.
///
/// Membership is fixed for the lifetime of an experiment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSet {
    validators: Arc<Vec<Validator>>,
}

impl ValidatorSet {
    /// Create a new validator set from an iterator of validators.
    ///
    /// Node ids must be unique; the set is sorted by id.
    ///
    /// # Panics
    /// If the validator set is empty.
    pub fn new(validators: impl IntoIterator<Item = Validator>) -> Self {
        let mut validators: Vec<_> = validators.into_iter().collect();
        assert!(!validators.is_empty());

        validators.sort_by_key(|v| v.id);
        validators.dedup_by_key(|v| v.id);

        Self {
            validators: Arc::new(validators),
        }
    }

    /// The number of validators in the set.
    pub fn count(&self) -> usize {
        self.validators.len()
    }

    /// Iterate over the validators in the set.
    pub fn iter(&self) -> slice::Iter<'_, Validator> {
        self.validators.iter()
    }

    /// Look up a validator by node id.
    pub fn get_by_id(&self, id: NodeId) -> Option<&Validator> {
        self.validators
            .binary_search_by_key(&id, |v| v.id)
            .ok()
            .map(|i| &self.validators[i])
    }

    /// Look up the public key of the given node id.
    pub fn public_key(&self, id: NodeId) -> Option<&PublicKey> {
        self.get_by_id(id).map(|v| &v.public_key)
    }
}
