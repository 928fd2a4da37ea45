use log::warn;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::operation::Operation;

/// An ordered batch of operations executed atomically by the store.
///
/// The last operation is always the single commit marker.
#[derive(Debug, Clone, PartialEq)]
pub struct TxSuite {
    ops: Vec<Operation>,
}

impl TxSuite {
    /// Closes `ops` with exactly one commit marker.
    ///
    /// Commit markers already present in `ops` are dropped so that the
    /// suite holds only the trailing one.
    pub fn compose(ops: impl IntoIterator<Item = Operation>) -> Self {
        let mut suite = Vec::new();
        for op in ops {
            if op.is_commit() {
                warn!("dropping commit marker inside a transaction");
                continue;
            }
            if let Operation::Delete { key } = &op {
                warn!("delete of {:?} is not a transactional operation", key);
            }
            suite.push(op);
        }
        suite.push(Operation::Commit);
        TxSuite { ops: suite }
    }

    /// A transaction reading one key.
    pub fn read(key: impl Into<String>) -> Self {
        Self::compose([Operation::read(key)])
    }

    /// A transaction writing one key.
    pub fn write(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compose([Operation::write(key, value)])
    }

    /// A transaction doing one test-and-set.
    pub fn test_and_set(
        key: impl Into<String>,
        old: impl Into<Value>,
        new: impl Into<Value>,
    ) -> Self {
        Self::compose([Operation::test_and_set(key, old, new)])
    }

    /// The operations of this suite, commit marker included.
    pub fn operations(&self) -> &[Operation] {
        &self.ops
    }

    /// Wire descriptors for every operation, in order.
    pub fn to_descriptors(&self) -> Vec<Value> {
        self.ops.iter().map(Operation::to_descriptor).collect()
    }
}

impl Serialize for TxSuite {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.ops.serialize(serializer)
    }
}
