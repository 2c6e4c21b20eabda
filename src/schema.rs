#![forbid(unsafe_code)]

//! Record schemas
//!
//! A record describes its fields once, in declaration order, through a
//! `Schema`: each field has a name, a rule expression and an accessor. The
//! engine walks this table instead of inspecting types at runtime.
//!
//! ```
//! use fieldrules::{Record, Schema};
//! use std::sync::LazyLock;
//!
//! struct Signup {
//!     name: String,
//!     age: u32,
//! }
//!
//! impl Record for Signup {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: LazyLock<Schema<Signup>> = LazyLock::new(|| {
//!             Schema::builder()
//!                 .field("name", "trim|string,min=1,max=20", |s: &mut Signup| &mut s.name)
//!                 .field("age", "number,min=18", |s: &mut Signup| &mut s.age)
//!                 .build()
//!         });
//!         &SCHEMA
//!     }
//! }
//! ```

use crate::engine::executor::Run;
use crate::types::{FieldValue, Value};
use std::ops::ControlFlow;

/// A type whose fields can be validated
pub trait Record: Sized + 'static {
    /// The record's field table, built once per type
    fn schema() -> &'static Schema<Self>;
}

/// A zero-argument record method usable as a rule
///
/// Returns `Err(message)` when the record is invalid.
pub type RecordMethod<R> = fn(&R) -> Result<(), String>;

/// Ordered field table for one record type
pub struct Schema<R> {
    fields: Vec<FieldSpec<R>>,
    methods: Vec<(&'static str, RecordMethod<R>)>,
}

impl<R: Record> Schema<R> {
    pub fn builder() -> SchemaBuilder<R> {
        SchemaBuilder {
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldSpec<R>] {
        &self.fields
    }

    /// The method registered under `name`, if any
    pub fn method(&self, name: &str) -> Option<RecordMethod<R>> {
        self.methods
            .iter()
            .find(|(method, _)| *method == name)
            .map(|(_, f)| *f)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.methods.iter().map(|(name, _)| *name)
    }
}

impl<R> std::fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<(&str, &str)> = self.fields.iter().map(|f| (f.name, f.rules)).collect();
        let methods: Vec<&str> = self.methods.iter().map(|(name, _)| *name).collect();
        f.debug_struct("Schema")
            .field("fields", &fields)
            .field("methods", &methods)
            .finish()
    }
}

/// One field of a record schema
pub struct FieldSpec<R> {
    name: &'static str,
    rules: &'static str,
    access: Box<dyn Accessor<R>>,
}

impl<R> FieldSpec<R> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The field's rule expression
    pub fn rules(&self) -> &'static str {
        self.rules
    }

    pub(crate) fn slot<'a>(&self, record: &'a mut R) -> Slot<'a> {
        self.access.slot(record)
    }
}

/// Builder for `Schema`
pub struct SchemaBuilder<R> {
    fields: Vec<FieldSpec<R>>,
    methods: Vec<(&'static str, RecordMethod<R>)>,
}

impl<R: Record> SchemaBuilder<R> {
    /// Add a settable field
    ///
    /// Clippers may rewrite settable fields.
    pub fn field<T>(self, name: &'static str, rules: &'static str, access: fn(&mut R) -> &mut T) -> Self
    where
        T: FieldValue + 'static,
    {
        self.push(name, rules, MutableField { access })
    }

    /// Add a read-only field
    ///
    /// Validating rules run as usual; clippers leave the field untouched.
    pub fn readonly<T>(self, name: &'static str, rules: &'static str, access: fn(&R) -> &T) -> Self
    where
        T: FieldValue + 'static,
    {
        self.push(name, rules, ReadOnlyField { access })
    }

    /// Add a nested record, validated depth-first before this field's rules
    pub fn nested<N>(self, name: &'static str, rules: &'static str, access: fn(&mut R) -> &mut N) -> Self
    where
        N: Record,
    {
        self.push(name, rules, NestedField { access })
    }

    /// Add an optional nested record
    ///
    /// An absent record is not traversed and reads as an empty value, so
    /// `require` rejects it.
    pub fn nested_opt<N>(
        self,
        name: &'static str,
        rules: &'static str,
        access: fn(&mut R) -> &mut Option<N>,
    ) -> Self
    where
        N: Record,
    {
        self.push(name, rules, OptionalNestedField { access })
    }

    /// Register a record method under a rule name
    ///
    /// Methods are the last resolution step: a rule name that no registry
    /// entry, built-in or table rule claims is looked up here.
    pub fn method(mut self, name: &'static str, method: RecordMethod<R>) -> Self {
        self.methods.push((name, method));
        self
    }

    pub fn build(self) -> Schema<R> {
        Schema {
            fields: self.fields,
            methods: self.methods,
        }
    }

    fn push(mut self, name: &'static str, rules: &'static str, access: impl Accessor<R> + 'static) -> Self {
        self.fields.push(FieldSpec {
            name,
            rules,
            access: Box::new(access),
        });
        self
    }
}

/// Borrowed view of one field while its rules run
pub(crate) enum Slot<'a> {
    Mutable(&'a mut dyn FieldValue),
    ReadOnly(&'a dyn FieldValue),
    Nested(Option<&'a mut dyn Nested>),
}

impl Slot<'_> {
    pub(crate) fn value(&self) -> Value {
        match self {
            Slot::Mutable(v) => v.to_value(),
            Slot::ReadOnly(v) => v.to_value(),
            Slot::Nested(Some(_)) => Value::Record,
            Slot::Nested(None) => Value::Null,
        }
    }
}

/// Object-safe handle to a nested record of any type
pub(crate) trait Nested {
    fn walk(&mut self, run: &mut Run<'_>) -> ControlFlow<()>;
}

impl<R: Record> Nested for R {
    fn walk(&mut self, run: &mut Run<'_>) -> ControlFlow<()> {
        run.walk_record(self)
    }
}

trait Accessor<R>: Send + Sync {
    fn slot<'a>(&self, record: &'a mut R) -> Slot<'a>;
}

struct MutableField<R, T> {
    access: fn(&mut R) -> &mut T,
}

impl<R, T: FieldValue + 'static> Accessor<R> for MutableField<R, T> {
    fn slot<'a>(&self, record: &'a mut R) -> Slot<'a> {
        Slot::Mutable((self.access)(record))
    }
}

struct ReadOnlyField<R, T> {
    access: fn(&R) -> &T,
}

impl<R, T: FieldValue + 'static> Accessor<R> for ReadOnlyField<R, T> {
    fn slot<'a>(&self, record: &'a mut R) -> Slot<'a> {
        Slot::ReadOnly((self.access)(record))
    }
}

struct NestedField<R, N> {
    access: fn(&mut R) -> &mut N,
}

impl<R, N: Record> Accessor<R> for NestedField<R, N> {
    fn slot<'a>(&self, record: &'a mut R) -> Slot<'a> {
        let nested: &'a mut dyn Nested = (self.access)(record);
        Slot::Nested(Some(nested))
    }
}

struct OptionalNestedField<R, N> {
    access: fn(&mut R) -> &mut Option<N>,
}

impl<R, N: Record> Accessor<R> for OptionalNestedField<R, N> {
    fn slot<'a>(&self, record: &'a mut R) -> Slot<'a> {
        Slot::Nested((self.access)(record).as_mut().map(|n| n as &mut dyn Nested))
    }
}
