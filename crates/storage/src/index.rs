use derive_more::Display;
use mongodb::bson::{Bson, Document};
use mongodb::IndexModel;

/// Result of asking the store for an index. Both variants are successes.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    #[display("index {} created", _0)]
    Created(String),
    #[display("index {} already exists", _0)]
    AlreadyExists(String),
}

impl IndexOutcome {
    pub fn name(&self) -> &str {
        match self {
            IndexOutcome::Created(name) | IndexOutcome::AlreadyExists(name) => name,
        }
    }

    pub fn already_existed(&self) -> bool {
        matches!(self, IndexOutcome::AlreadyExists(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexSummary {
    pub name: String,
    pub keys: Document,
}

impl From<IndexModel> for IndexSummary {
    fn from(model: IndexModel) -> Self {
        let name = model
            .options
            .and_then(|options| options.name)
            .unwrap_or_else(|| default_index_name(&model.keys));
        IndexSummary { name, keys: model.keys }
    }
}

/// The name the server assigns when none is given, e.g. `author_1_published_year_1`.
pub fn default_index_name(keys: &Document) -> String {
    keys.iter()
        .map(|(field, direction)| match direction {
            Bson::String(kind) => format!("{}_{}", field, kind),
            other => format!("{}_{}", field, direction_of(other).unwrap_or(1)),
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// Whether two key patterns describe the same index.
///
/// Field order matters; numeric directions are compared by value since the server may
/// report `1` as an int32, int64 or double.
pub fn same_key_pattern(a: &Document, b: &Document) -> bool {
    a.len() == b.len()
        && a.iter().zip(b.iter()).all(|((field_a, dir_a), (field_b, dir_b))| {
            field_a == field_b
                && match (direction_of(dir_a), direction_of(dir_b)) {
                    (Some(x), Some(y)) => x == y,
                    _ => dir_a == dir_b,
                }
        })
}

fn direction_of(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(*v as i64),
        Bson::Int64(v) => Some(*v),
        Bson::Double(v) if v.fract() == 0.0 => Some(*v as i64),
        _ => None,
    }
}
