//! Named variable store shared between scripts and their host.
//!
//! Scripts write through the `store*` natives and the host polls with the
//! typed getters (or the other way round). Reads never cast: asking for a
//! float when an int is stored is a [`VarStoreError::TypeMismatch`].

use core_types::{Operand, Precision, ValueType, VarResult, VarStoreError, Vec2};
use std::collections::{BTreeMap, HashMap};

/// Default upper bound on array lengths
pub const DEFAULT_MAX_ARRAY_LEN: usize = 1 << 20;

/// Fixed-length typed array stored under a name
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptArray {
    /// `int` elements
    Int(Vec<i32>),
    /// `float` elements, kept at double width
    Float(Vec<f64>),
    /// `bool` elements
    Bool(Vec<bool>),
    /// `string` elements
    Str(Vec<String>),
}

impl ScriptArray {
    /// Element type
    pub fn element_type(&self) -> ValueType {
        match self {
            ScriptArray::Int(_) => ValueType::Int,
            ScriptArray::Float(_) => ValueType::Float,
            ScriptArray::Bool(_) => ValueType::Bool,
            ScriptArray::Str(_) => ValueType::String,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            ScriptArray::Int(v) => v.len(),
            ScriptArray::Float(v) => v.len(),
            ScriptArray::Bool(v) => v.len(),
            ScriptArray::Str(v) => v.len(),
        }
    }

    /// Returns true if the array has no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Map of named values plus named typed arrays.
///
/// # Examples
///
/// ```
/// use builtins::VarStore;
///
/// let mut vars = VarStore::new();
/// vars.store_int("k", 5);
/// assert_eq!(vars.get_int("k").unwrap(), 5);
/// assert!(vars.get_float("k").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct VarStore {
    values: HashMap<String, Operand>,
    arrays: HashMap<String, ScriptArray>,
    precision: Precision,
    max_array_len: usize,
}

impl Default for VarStore {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
            arrays: HashMap::new(),
            precision: Precision::default(),
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
        }
    }
}

impl VarStore {
    /// Create an empty store in single precision
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the length of arrays created from now on
    pub fn set_max_array_len(&mut self, max: usize) {
        self.max_array_len = max;
    }

    /// Largest array length [`VarStore::new_array`] accepts
    pub fn max_array_len(&self) -> usize {
        self.max_array_len
    }

    /// Select the width used for stored floats
    pub fn set_use_double(&mut self, use_double: bool) {
        self.precision = Precision::from_use_double(use_double);
    }

    /// Returns true if floats are stored at double width
    pub fn is_using_double(&self) -> bool {
        self.precision.is_double()
    }

    /// Current float precision
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Store any value; floats are normalized to the store's precision
    pub fn store(&mut self, name: &str, value: Operand) {
        let value = match value {
            Operand::Float(n) => Operand::float(f64::from(n), self.precision),
            Operand::Double(n) => Operand::float(n, self.precision),
            other => other,
        };
        self.values.insert(name.to_string(), value);
    }

    /// `storeInt`
    pub fn store_int(&mut self, name: &str, value: i32) {
        self.store(name, Operand::Int(value));
    }

    /// `storeFloat`
    pub fn store_float(&mut self, name: &str, value: f64) {
        self.store(name, Operand::Double(value));
    }

    /// `storeString`
    pub fn store_string(&mut self, name: &str, value: impl Into<String>) {
        self.store(name, Operand::Str(value.into()));
    }

    /// `storeBool`
    pub fn store_bool(&mut self, name: &str, value: bool) {
        self.store(name, Operand::Bool(value));
    }

    /// `storeVec`
    pub fn store_vec2(&mut self, name: &str, value: Vec2) {
        self.store(name, Operand::Vec2(value));
    }

    /// Raw stored value
    pub fn get(&self, name: &str) -> Option<&Operand> {
        self.values.get(name)
    }

    fn typed(&self, name: &str, expected: ValueType) -> VarResult<&Operand> {
        let value = self.values.get(name).ok_or_else(|| VarStoreError::Missing {
            name: name.to_string(),
        })?;
        if value.value_type() != expected {
            return Err(VarStoreError::TypeMismatch {
                name: name.to_string(),
                expected,
                found: value.value_type(),
            });
        }
        Ok(value)
    }

    /// `getInt`
    pub fn get_int(&self, name: &str) -> VarResult<i32> {
        let value = self.typed(name, ValueType::Int)?;
        Ok(value.as_int().unwrap_or_default())
    }

    /// `getFloat`; accepts either float width, never an int
    pub fn get_float(&self, name: &str) -> VarResult<f64> {
        let value = self.typed(name, ValueType::Float)?;
        Ok(value.as_float().unwrap_or_default())
    }

    /// `getString`
    pub fn get_string(&self, name: &str) -> VarResult<&str> {
        let value = self.typed(name, ValueType::String)?;
        Ok(value.as_str().unwrap_or_default())
    }

    /// `getBool`
    pub fn get_bool(&self, name: &str) -> VarResult<bool> {
        let value = self.typed(name, ValueType::Bool)?;
        Ok(value.as_bool().unwrap_or_default())
    }

    /// `getVec`
    pub fn get_vec2(&self, name: &str) -> VarResult<Vec2> {
        let value = self.typed(name, ValueType::Vec2)?;
        Ok(value.as_vec2().unwrap_or_default())
    }

    /// Returns true if a value (not an array) is stored under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Remove a value, returning it
    pub fn remove(&mut self, name: &str) -> Option<Operand> {
        self.values.remove(name)
    }

    /// Number of stored values (arrays excluded)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no values are stored
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Remove all values and arrays
    pub fn clear(&mut self) {
        self.values.clear();
        self.arrays.clear();
    }

    /// Create (or replace) a zero-filled array.
    ///
    /// Lengths that are negative or above [`VarStore::max_array_len`] are
    /// rejected before anything is allocated.
    pub fn new_array(&mut self, name: &str, element: ValueType, length: i32) -> VarResult<()> {
        let len = usize::try_from(length)
            .ok()
            .filter(|&len| len <= self.max_array_len)
            .ok_or_else(|| VarStoreError::InvalidLength {
                name: name.to_string(),
                length,
            })?;
        let array = match element {
            ValueType::Int => ScriptArray::Int(vec![0; len]),
            ValueType::Float => ScriptArray::Float(vec![0.0; len]),
            ValueType::Bool => ScriptArray::Bool(vec![false; len]),
            ValueType::String => ScriptArray::Str(vec![String::new(); len]),
            ValueType::Vec2 | ValueType::Void => {
                return Err(VarStoreError::TypeMismatch {
                    name: name.to_string(),
                    expected: ValueType::Int,
                    found: element,
                })
            }
        };
        self.arrays.insert(name.to_string(), array);
        Ok(())
    }

    /// Array stored under `name`
    pub fn array(&self, name: &str) -> Option<&ScriptArray> {
        self.arrays.get(name)
    }

    /// Length of the array stored under `name`
    pub fn array_length(&self, name: &str) -> VarResult<usize> {
        self.arrays
            .get(name)
            .map(ScriptArray::len)
            .ok_or_else(|| VarStoreError::Missing {
                name: name.to_string(),
            })
    }

    /// Remove an array, returning true if it existed
    pub fn delete_array(&mut self, name: &str) -> bool {
        self.arrays.remove(name).is_some()
    }

    /// Read element `index` of an array of type `element`
    pub fn access(&self, name: &str, element: ValueType, index: i32) -> VarResult<Operand> {
        let array = self.array_of(name, element)?;
        let idx = checked_index(name, index, array.len())?;
        Ok(match array {
            ScriptArray::Int(v) => Operand::Int(v[idx]),
            ScriptArray::Float(v) => Operand::float(v[idx], self.precision),
            ScriptArray::Bool(v) => Operand::Bool(v[idx]),
            ScriptArray::Str(v) => Operand::Str(v[idx].clone()),
        })
    }

    /// Write element `index` of an array; `value` must match its element type
    pub fn assign(&mut self, name: &str, index: i32, value: Operand) -> VarResult<()> {
        let element = value.value_type();
        let array = self
            .arrays
            .get_mut(name)
            .ok_or_else(|| VarStoreError::Missing {
                name: name.to_string(),
            })?;
        let idx = checked_index(name, index, array.len())?;
        match (array, value) {
            (ScriptArray::Int(v), Operand::Int(n)) => v[idx] = n,
            (ScriptArray::Float(v), Operand::Float(n)) => v[idx] = f64::from(n),
            (ScriptArray::Float(v), Operand::Double(n)) => v[idx] = n,
            (ScriptArray::Bool(v), Operand::Bool(b)) => v[idx] = b,
            (ScriptArray::Str(v), Operand::Str(s)) => v[idx] = s,
            (array, _) => {
                return Err(VarStoreError::TypeMismatch {
                    name: name.to_string(),
                    expected: array.element_type(),
                    found: element,
                })
            }
        }
        Ok(())
    }

    fn array_of(&self, name: &str, element: ValueType) -> VarResult<&ScriptArray> {
        let array = self.arrays.get(name).ok_or_else(|| VarStoreError::Missing {
            name: name.to_string(),
        })?;
        if array.element_type() != element {
            return Err(VarStoreError::TypeMismatch {
                name: name.to_string(),
                expected: element,
                found: array.element_type(),
            });
        }
        Ok(array)
    }

    /// Sorted copy of every stored value, for dumps
    pub fn snapshot(&self) -> BTreeMap<String, Operand> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

fn checked_index(name: &str, index: i32, length: usize) -> VarResult<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&idx| idx < length)
        .ok_or_else(|| VarStoreError::IndexOutOfBounds {
            name: name.to_string(),
            index,
            length,
        })
}
