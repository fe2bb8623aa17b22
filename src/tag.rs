use crate::Timestamp;

/// Metadata of a measurement channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    /// Unique identifier
    pub id: String,

    /// Display name, must not be empty
    pub name: String,

    /// Unit of measurement, must not be empty
    pub unit: String,

    /// Number of decimal places the values are meaningful to
    pub decimal_precision: u32,

    /// Label copied into every reading written for this tag
    pub tag_label: String,

    /// Creation time (epoch millis), set by the store
    pub created_at: Timestamp,

    /// Soft-delete flag
    pub deactivated: bool,
}

impl Tag {
    /// Creates an active tag; `created_at` is assigned by the store.
    #[must_use]
    pub fn new<I, N, U, L>(id: I, name: N, unit: U, tag_label: L) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        U: Into<String>,
        L: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            unit: unit.into(),
            decimal_precision: 2,
            tag_label: tag_label.into(),
            created_at: 0,
            deactivated: false,
        }
    }

    /// Sets the decimal precision.
    #[must_use]
    pub fn decimal_precision(mut self, decimal_precision: u32) -> Self {
        self.decimal_precision = decimal_precision;
        self
    }

    /// A tag is valid if it has both a name and a unit.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.unit.is_empty()
    }

    pub(crate) fn validate(&self) -> crate::Result<()> {
        if self.id.is_empty() {
            return Err(crate::Error::invalid_argument("tag_id", "tag id is not set"));
        }
        if !self.is_valid() {
            return Err(crate::Error::invalid_argument(
                "tag",
                format!("tag {:?} has no name or unit set", self.id),
            ));
        }
        Ok(())
    }

    /// Applies a partial update, leaving fields that are `None` untouched.
    pub fn apply(&mut self, changes: TagChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(unit) = changes.unit {
            self.unit = unit;
        }
        if let Some(decimal_precision) = changes.decimal_precision {
            self.decimal_precision = decimal_precision;
        }
        if let Some(tag_label) = changes.tag_label {
            self.tag_label = tag_label;
        }
    }
}

/// Partial update of a [`Tag`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagChanges {
    /// New display name
    pub name: Option<String>,

    /// New unit
    pub unit: Option<String>,

    /// New decimal precision
    pub decimal_precision: Option<u32>,

    /// New label
    ///
    /// Readings written before the change keep their old label.
    pub tag_label: Option<String>,
}
