//! Static table descriptors and schema-driven encoding/decoding.
//!
//! A [`TableDef`] is the static configuration a schema compiler would emit for
//! one table kind: field names, slots, types and per-field defaults. With it a
//! [`Table`] can be decoded into a dynamic [`Record`], and a `Record` can be
//! written through a [`Builder`].
//!
//! # Beispiel
//!
//! ```
//! use tablebuf::schema::{FieldDef, FieldDefault, Record, ScalarType, TableDef, Value};
//! use tablebuf::options::DecodeLimits;
//! use tablebuf::{Builder, Table};
//!
//! static OPERATOR_CODE: TableDef = TableDef::new(
//!     "OperatorCode",
//!     &[
//!         FieldDef::scalar("builtin_code", 0, ScalarType::Int8, FieldDefault::Int(0)),
//!         FieldDef::string("custom_code", 1),
//!         FieldDef::scalar("version", 2, ScalarType::Int32, FieldDefault::Int(1)),
//!     ],
//! );
//!
//! let record = Record::new(&OPERATOR_CODE)
//!     .with("builtin_code", Value::Int(2))
//!     .unwrap();
//!
//! let mut b = Builder::new();
//! let root = OPERATOR_CODE.encode(&mut b, &record).unwrap();
//! b.finish(root).unwrap();
//!
//! let table = Table::open(b.finished_data().unwrap(), 0).unwrap();
//! let decoded = OPERATOR_CODE.decode(&table, &DecodeLimits::default()).unwrap();
//! assert_eq!(decoded.get("version"), Some(&Value::Int(1)));
//! assert_eq!(decoded.get("custom_code"), None);
//! ```

use core::fmt;

use crate::builder::{Builder, Offset, StringMarker, TableMarker, VectorMarker, MAX_FIELD_COUNT};
use crate::options::DecodeLimits;
use crate::scalar::Scalar;
use crate::table::{Follow, Table};
use crate::{Error, FastIndexMap, Result};

/// Wire type of a scalar field or vector element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

impl ScalarType {
    /// Size in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Schema name of the type.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }
}

/// Element type of a vector field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementType {
    Scalar(ScalarType),
    String,
    Table(&'static TableDef),
}

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldType {
    Scalar(ScalarType),
    String,
    Table(&'static TableDef),
    Vector(ElementType),
}

/// Default of a scalar field. Offset fields have no default (`None`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    None,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl FieldDefault {
    fn as_bool(self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => b,
            Self::Int(i) => i != 0,
            Self::UInt(u) => u != 0,
            Self::Float(f) => f != 0.0,
        }
    }

    fn as_i64(self) -> i64 {
        match self {
            Self::None => 0,
            Self::Bool(b) => i64::from(b),
            Self::Int(i) => i,
            Self::UInt(u) => u as i64,
            Self::Float(f) => f as i64,
        }
    }

    fn as_u64(self) -> u64 {
        match self {
            Self::None => 0,
            Self::Bool(b) => u64::from(b),
            Self::Int(i) => i as u64,
            Self::UInt(u) => u,
            Self::Float(f) => f as u64,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Bool(b) => f64::from(u8::from(b)),
            Self::Int(i) => i as f64,
            Self::UInt(u) => u as f64,
            Self::Float(f) => f,
        }
    }
}

/// One field declaration: `(name, slot, type, default)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDef {
    pub name: &'static str,
    pub slot: usize,
    pub ty: FieldType,
    pub default: FieldDefault,
}

impl FieldDef {
    pub const fn scalar(name: &'static str, slot: usize, ty: ScalarType, default: FieldDefault) -> Self {
        Self { name, slot, ty: FieldType::Scalar(ty), default }
    }

    pub const fn string(name: &'static str, slot: usize) -> Self {
        Self { name, slot, ty: FieldType::String, default: FieldDefault::None }
    }

    pub const fn table(name: &'static str, slot: usize, def: &'static TableDef) -> Self {
        Self { name, slot, ty: FieldType::Table(def), default: FieldDefault::None }
    }

    pub const fn vector(name: &'static str, slot: usize, element: ElementType) -> Self {
        Self { name, slot, ty: FieldType::Vector(element), default: FieldDefault::None }
    }
}

/// Static descriptor of one table kind.
#[derive(Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub fields: &'static [FieldDef],
}

// Tabellen duerfen sich selbst referenzieren: Debug/PartialEq folgen keinen Kindern.
impl fmt::Debug for TableDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.fields.iter().map(|field| field.name).collect();
        f.debug_struct("TableDef").field("name", &self.name).field("fields", &names).finish()
    }
}

impl PartialEq for TableDef {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other) || self.name == other.name
    }
}

impl TableDef {
    pub const fn new(name: &'static str, fields: &'static [FieldDef]) -> Self {
        Self { name, fields }
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Number of slots (highest declared slot + 1).
    pub fn field_count(&self) -> usize {
        self.fields.iter().map(|f| f.slot + 1).max().unwrap_or(0)
    }

    /// Decodes every declared field of `table`.
    ///
    /// Scalar fields are always present in the result (absent ones carry the
    /// declared default); offset fields only when stored. Nested tables are
    /// decoded recursively within `limits`.
    pub fn decode(&'static self, table: &Table<'_>, limits: &DecodeLimits) -> Result<Record> {
        let mut walk = Walk { limits, tables: 0 };
        self.decode_at(table, 1, &mut walk)
    }

    fn decode_at(&'static self, table: &Table<'_>, depth: usize, walk: &mut Walk<'_>) -> Result<Record> {
        walk.enter(self, depth)?;
        let mut record = Record::new(self);
        for field in self.fields {
            let slot = field.slot;
            let value = match field.ty {
                FieldType::Scalar(ty) => Some(read_scalar(table, slot, ty, field.default)?),
                FieldType::String => table.get_str(slot)?.map(|s| Value::String(s.to_owned())),
                FieldType::Table(def) => match table.get_table(slot)? {
                    Some(child) => Some(Value::Table(def.decode_at(&child, depth + 1, walk)?)),
                    None => None,
                },
                FieldType::Vector(element) => read_vector(table, slot, element, depth, walk)?,
            };
            if let Some(value) = value {
                record.values.insert(field.name, value);
            }
        }
        Ok(record)
    }

    /// Writes `record` bottom-up: strings, vectors and child tables first, then
    /// the object itself with its fields in slot order.
    pub fn encode(&'static self, builder: &mut Builder, record: &Record) -> Result<Offset<TableMarker>> {
        if record.def != self {
            return Err(Error::TypeMismatch { field: record.def.name, expected: self.name });
        }

        let field_count = self.field_count();
        if field_count > MAX_FIELD_COUNT {
            return Err(Error::malformed(format!(
                "table {} declares {field_count} slots, more than a vtable can hold",
                self.name
            )));
        }
        let mut children: Vec<Option<Child>> = vec![None; field_count];
        for field in self.fields {
            let Some(value) = record.values.get(field.name) else {
                continue;
            };
            let child = match (field.ty, value) {
                (FieldType::Scalar(_), _) => continue,
                (FieldType::String, Value::String(s)) => Child::String(builder.create_string(s)?),
                (FieldType::Table(def), Value::Table(r)) => Child::Table(def.encode(builder, r)?),
                (FieldType::Vector(element), Value::Vector(items)) => {
                    Child::Vector(write_vector(builder, field, element, items)?)
                }
                _ => return Err(mismatch(field)),
            };
            children[field.slot] = Some(child);
        }

        let mut ordered: Vec<&FieldDef> = self.fields.iter().collect();
        ordered.sort_by_key(|f| f.slot);

        builder.start_object(field_count)?;
        for field in ordered {
            match field.ty {
                FieldType::Scalar(ty) => {
                    add_scalar(builder, field, ty, record.values.get(field.name))?;
                }
                _ => {
                    if let Some(child) = children[field.slot] {
                        match child {
                            Child::String(off) => builder.add_offset_field(field.slot, off)?,
                            Child::Table(off) => builder.add_offset_field(field.slot, off)?,
                            Child::Vector(off) => builder.add_offset_field(field.slot, off)?,
                        }
                    }
                }
            }
        }
        builder.end_object()
    }
}

/// Dynamic field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Table(Record),
    Vector(Vec<Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer value, if it fits an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Table(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Self::Vector(items) => Some(items),
            _ => None,
        }
    }
}

/// Field values of one table, keyed by field name in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    def: &'static TableDef,
    values: FastIndexMap<&'static str, Value>,
}

impl Record {
    pub fn new(def: &'static TableDef) -> Self {
        Self { def, values: FastIndexMap::default() }
    }

    pub fn def(&self) -> &'static TableDef {
        self.def
    }

    /// Sets a field after checking its name and the value's type and range.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let field = self.def.field(name).ok_or_else(|| Error::UnknownField {
            table: self.def.name,
            field: name.to_owned(),
        })?;
        check_value(field, field.ty, &value)?;
        self.values.insert(field.name, value);
        Ok(())
    }

    /// Builder-style [`Record::set`].
    pub fn with(mut self, name: &str, value: Value) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.values.iter().map(|(name, value)| (*name, value))
    }
}

// --- Decoding ---

/// Tiefen- und Tabellenbudget eines Decode-Laufs.
struct Walk<'l> {
    limits: &'l DecodeLimits,
    tables: usize,
}

impl Walk<'_> {
    fn enter(&mut self, def: &TableDef, depth: usize) -> Result<()> {
        if depth > self.limits.max_depth {
            return Err(Error::limit_exceeded(format!(
                "table '{}' at depth {depth} exceeds max_depth {}",
                def.name, self.limits.max_depth
            )));
        }
        self.tables += 1;
        if self.tables > self.limits.max_tables {
            return Err(Error::limit_exceeded(format!(
                "more than {} tables decoded",
                self.limits.max_tables
            )));
        }
        Ok(())
    }
}

fn read_scalar(table: &Table<'_>, slot: usize, ty: ScalarType, default: FieldDefault) -> Result<Value> {
    Ok(match ty {
        ScalarType::Bool => Value::Bool(table.get_field::<bool>(slot, default.as_bool())?),
        ScalarType::Int8 => Value::Int(table.get_field::<i8>(slot, default.as_i64() as i8)?.into()),
        ScalarType::Int16 => Value::Int(table.get_field::<i16>(slot, default.as_i64() as i16)?.into()),
        ScalarType::Int32 => Value::Int(table.get_field::<i32>(slot, default.as_i64() as i32)?.into()),
        ScalarType::Int64 => Value::Int(table.get_field::<i64>(slot, default.as_i64())?),
        ScalarType::UInt8 => Value::UInt(table.get_field::<u8>(slot, default.as_u64() as u8)?.into()),
        ScalarType::UInt16 => Value::UInt(table.get_field::<u16>(slot, default.as_u64() as u16)?.into()),
        ScalarType::UInt32 => Value::UInt(table.get_field::<u32>(slot, default.as_u64() as u32)?.into()),
        ScalarType::UInt64 => Value::UInt(table.get_field::<u64>(slot, default.as_u64())?),
        ScalarType::Float32 => Value::Float(table.get_field::<f32>(slot, default.as_f64() as f32)?.into()),
        ScalarType::Float64 => Value::Float(table.get_field::<f64>(slot, default.as_f64())?),
    })
}

fn scalar_vector<'a, T, F>(table: &Table<'a>, slot: usize, wrap: F) -> Result<Option<Value>>
where
    T: Follow<'a>,
    F: Fn(T) -> Value,
{
    match table.get_vector::<T>(slot)? {
        None => Ok(None),
        Some(vector) => {
            let items = vector.iter().map(|item| item.map(&wrap)).collect::<Result<Vec<_>>>()?;
            Ok(Some(Value::Vector(items)))
        }
    }
}

fn read_vector(
    table: &Table<'_>,
    slot: usize,
    element: ElementType,
    depth: usize,
    walk: &mut Walk<'_>,
) -> Result<Option<Value>> {
    match element {
        ElementType::Scalar(ty) => match ty {
            ScalarType::Bool => scalar_vector(table, slot, Value::Bool),
            ScalarType::Int8 => scalar_vector(table, slot, |v: i8| Value::Int(v.into())),
            ScalarType::Int16 => scalar_vector(table, slot, |v: i16| Value::Int(v.into())),
            ScalarType::Int32 => scalar_vector(table, slot, |v: i32| Value::Int(v.into())),
            ScalarType::Int64 => scalar_vector(table, slot, Value::Int),
            ScalarType::UInt8 => scalar_vector(table, slot, |v: u8| Value::UInt(v.into())),
            ScalarType::UInt16 => scalar_vector(table, slot, |v: u16| Value::UInt(v.into())),
            ScalarType::UInt32 => scalar_vector(table, slot, |v: u32| Value::UInt(v.into())),
            ScalarType::UInt64 => scalar_vector(table, slot, Value::UInt),
            ScalarType::Float32 => scalar_vector(table, slot, |v: f32| Value::Float(v.into())),
            ScalarType::Float64 => scalar_vector(table, slot, Value::Float),
        },
        ElementType::String => scalar_vector::<&str, _>(table, slot, |s| Value::String(s.to_owned())),
        ElementType::Table(def) => match table.get_vector::<Table<'_>>(slot)? {
            None => Ok(None),
            Some(vector) => {
                let mut items = Vec::with_capacity(vector.len());
                for child in vector.iter() {
                    items.push(Value::Table(def.decode_at(&child?, depth + 1, walk)?));
                }
                Ok(Some(Value::Vector(items)))
            }
        },
    }
}

// --- Encoding ---

#[derive(Clone, Copy)]
enum Child {
    String(Offset<StringMarker>),
    Table(Offset<TableMarker>),
    Vector(Offset<VectorMarker>),
}

fn mismatch(field: &FieldDef) -> Error {
    let expected = match field.ty {
        FieldType::Scalar(ty) => ty.name(),
        FieldType::String => "string",
        FieldType::Table(def) => def.name,
        FieldType::Vector(_) => "vector",
    };
    Error::TypeMismatch { field: field.name, expected }
}

fn scalar_mismatch(field: &FieldDef, ty: ScalarType) -> Error {
    Error::TypeMismatch { field: field.name, expected: ty.name() }
}

fn bool_value(field: &FieldDef, value: &Value) -> Result<bool> {
    value.as_bool().ok_or_else(|| scalar_mismatch(field, ScalarType::Bool))
}

/// Ganzzahl mit Bereichspruefung fuer den Zieltyp.
fn int_value<T: TryFrom<i128>>(field: &FieldDef, ty: ScalarType, value: &Value) -> Result<T> {
    let wide = match value {
        Value::Int(i) => i128::from(*i),
        Value::UInt(u) => i128::from(*u),
        _ => return Err(scalar_mismatch(field, ty)),
    };
    T::try_from(wide).map_err(|_| scalar_mismatch(field, ty))
}

fn float_value(field: &FieldDef, ty: ScalarType, value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| scalar_mismatch(field, ty))
}

/// Endliche Werte muessen auch als f32 endlich bleiben.
fn f32_value(field: &FieldDef, value: &Value) -> Result<f32> {
    let wide = float_value(field, ScalarType::Float32, value)?;
    let narrow = wide as f32;
    if wide.is_finite() && !narrow.is_finite() {
        return Err(scalar_mismatch(field, ScalarType::Float32));
    }
    Ok(narrow)
}

fn check_scalar(field: &FieldDef, ty: ScalarType, value: &Value) -> Result<()> {
    match ty {
        ScalarType::Bool => bool_value(field, value).map(drop),
        ScalarType::Int8 => int_value::<i8>(field, ty, value).map(drop),
        ScalarType::Int16 => int_value::<i16>(field, ty, value).map(drop),
        ScalarType::Int32 => int_value::<i32>(field, ty, value).map(drop),
        ScalarType::Int64 => int_value::<i64>(field, ty, value).map(drop),
        ScalarType::UInt8 => int_value::<u8>(field, ty, value).map(drop),
        ScalarType::UInt16 => int_value::<u16>(field, ty, value).map(drop),
        ScalarType::UInt32 => int_value::<u32>(field, ty, value).map(drop),
        ScalarType::UInt64 => int_value::<u64>(field, ty, value).map(drop),
        ScalarType::Float32 => f32_value(field, value).map(drop),
        ScalarType::Float64 => float_value(field, ty, value).map(drop),
    }
}

fn check_element(field: &FieldDef, element: ElementType, value: &Value) -> Result<()> {
    match element {
        ElementType::Scalar(ty) => check_scalar(field, ty, value),
        ElementType::String => check_value(field, FieldType::String, value),
        ElementType::Table(def) => check_value(field, FieldType::Table(def), value),
    }
}

fn check_value(field: &FieldDef, ty: FieldType, value: &Value) -> Result<()> {
    match (ty, value) {
        (FieldType::Scalar(ty), value) => check_scalar(field, ty, value),
        (FieldType::String, Value::String(_)) => Ok(()),
        (FieldType::Table(def), Value::Table(r)) if r.def == def => Ok(()),
        (FieldType::Vector(element), Value::Vector(items)) => {
            items.iter().try_for_each(|item| check_element(field, element, item))
        }
        _ => Err(mismatch(field)),
    }
}

fn add_int<T>(builder: &mut Builder, field: &FieldDef, ty: ScalarType, value: Option<&Value>, default: T) -> Result<()>
where
    T: Scalar + TryFrom<i128>,
{
    let v = match value {
        Some(value) => int_value::<T>(field, ty, value)?,
        None => default,
    };
    builder.add_field(field.slot, v, default)
}

fn add_scalar(builder: &mut Builder, field: &FieldDef, ty: ScalarType, value: Option<&Value>) -> Result<()> {
    let d = field.default;
    match ty {
        ScalarType::Bool => {
            let v = match value {
                Some(value) => bool_value(field, value)?,
                None => d.as_bool(),
            };
            builder.add_field(field.slot, v, d.as_bool())
        }
        ScalarType::Int8 => add_int(builder, field, ty, value, d.as_i64() as i8),
        ScalarType::Int16 => add_int(builder, field, ty, value, d.as_i64() as i16),
        ScalarType::Int32 => add_int(builder, field, ty, value, d.as_i64() as i32),
        ScalarType::Int64 => add_int(builder, field, ty, value, d.as_i64()),
        ScalarType::UInt8 => add_int(builder, field, ty, value, d.as_u64() as u8),
        ScalarType::UInt16 => add_int(builder, field, ty, value, d.as_u64() as u16),
        ScalarType::UInt32 => add_int(builder, field, ty, value, d.as_u64() as u32),
        ScalarType::UInt64 => add_int(builder, field, ty, value, d.as_u64()),
        ScalarType::Float32 => {
            let v = match value {
                Some(value) => f32_value(field, value)?,
                None => d.as_f64() as f32,
            };
            builder.add_field(field.slot, v, d.as_f64() as f32)
        }
        ScalarType::Float64 => {
            let v = match value {
                Some(value) => float_value(field, ty, value)?,
                None => d.as_f64(),
            };
            builder.add_field(field.slot, v, d.as_f64())
        }
    }
}

fn int_vector<T>(builder: &mut Builder, field: &FieldDef, ty: ScalarType, items: &[Value]) -> Result<Offset<VectorMarker>>
where
    T: Scalar + TryFrom<i128>,
{
    let values = items
        .iter()
        .map(|item| int_value::<T>(field, ty, item))
        .collect::<Result<Vec<T>>>()?;
    builder.create_vector(&values)
}

fn write_vector(
    builder: &mut Builder,
    field: &FieldDef,
    element: ElementType,
    items: &[Value],
) -> Result<Offset<VectorMarker>> {
    match element {
        ElementType::Scalar(ty) => match ty {
            ScalarType::Bool => {
                let values = items.iter().map(|v| bool_value(field, v)).collect::<Result<Vec<_>>>()?;
                builder.create_vector(&values)
            }
            ScalarType::Int8 => int_vector::<i8>(builder, field, ty, items),
            ScalarType::Int16 => int_vector::<i16>(builder, field, ty, items),
            ScalarType::Int32 => int_vector::<i32>(builder, field, ty, items),
            ScalarType::Int64 => int_vector::<i64>(builder, field, ty, items),
            ScalarType::UInt8 => int_vector::<u8>(builder, field, ty, items),
            ScalarType::UInt16 => int_vector::<u16>(builder, field, ty, items),
            ScalarType::UInt32 => int_vector::<u32>(builder, field, ty, items),
            ScalarType::UInt64 => int_vector::<u64>(builder, field, ty, items),
            ScalarType::Float32 => {
                let values = items
                    .iter()
                    .map(|v| f32_value(field, v))
                    .collect::<Result<Vec<_>>>()?;
                builder.create_vector(&values)
            }
            ScalarType::Float64 => {
                let values = items.iter().map(|v| float_value(field, ty, v)).collect::<Result<Vec<_>>>()?;
                builder.create_vector(&values)
            }
        },
        ElementType::String => {
            let mut offsets = Vec::with_capacity(items.len());
            for item in items {
                let s = item.as_str().ok_or_else(|| mismatch(field))?;
                offsets.push(builder.create_string(s)?);
            }
            builder.create_vector_of_offsets(&offsets)
        }
        ElementType::Table(def) => {
            let mut offsets = Vec::with_capacity(items.len());
            for item in items {
                let record = item.as_record().ok_or_else(|| mismatch(field))?;
                offsets.push(def.encode(builder, record)?);
            }
            builder.create_vector_of_offsets(&offsets)
        }
    }
}
