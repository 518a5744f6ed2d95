//! Schema types as introspectable objects.

use crate::kinds::TypeKind;
use crate::members::{EnumValue, Field, InputValue};
use crate::object::{type_object, EnumValueFields, FieldFields, InputValueFields, TypeFields};
use async_trait::async_trait;
use gqlcore_service::{AsObject, FieldParams, Object, SchemaError, SchemaResult};
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// Kind-specific data.
///
/// Lists are filled once while the schema is built, after every type they
/// refer to exists, and are read without locking afterwards. References to
/// other named types are weak; the schema owns every type.
enum TypeData {
    Scalar,
    Object {
        fields: OnceLock<Vec<Arc<Field>>>,
        interfaces: OnceLock<Vec<Weak<Type>>>,
    },
    Interface {
        fields: OnceLock<Vec<Arc<Field>>>,
        possible_types: OnceLock<Vec<Weak<Type>>>,
    },
    Union {
        possible_types: OnceLock<Vec<Weak<Type>>>,
    },
    Enum {
        values: OnceLock<Vec<Arc<EnumValue>>>,
    },
    InputObject {
        fields: OnceLock<Vec<Arc<InputValue>>>,
    },
    /// `LIST` or `NON_NULL`.
    Wrapper { of_type: Arc<Type> },
}

/// A type of the schema, of any of the eight kinds.
pub struct Type {
    kind: TypeKind,
    name: Option<String>,
    description: Option<String>,
    data: TypeData,
    object: Object,
}

impl Type {
    /// Creates a named type. Kind-specific lists are added afterwards with
    /// the `add_*` methods.
    pub fn named(kind: TypeKind, name: impl Into<String>, description: Option<&str>) -> SchemaResult<Arc<Self>> {
        let data = match kind {
            TypeKind::Scalar => TypeData::Scalar,
            TypeKind::Object => TypeData::Object {
                fields: OnceLock::new(),
                interfaces: OnceLock::new(),
            },
            TypeKind::Interface => TypeData::Interface {
                fields: OnceLock::new(),
                possible_types: OnceLock::new(),
            },
            TypeKind::Union => TypeData::Union {
                possible_types: OnceLock::new(),
            },
            TypeKind::Enum => TypeData::Enum {
                values: OnceLock::new(),
            },
            TypeKind::InputObject => TypeData::InputObject {
                fields: OnceLock::new(),
            },
            TypeKind::List | TypeKind::NonNull => {
                return Err(SchemaError::new(format!("{kind} types cannot be named")));
            }
        };

        Ok(Self::build(kind, Some(name.into()), description.map(str::to_string), data))
    }

    /// Creates a `LIST` or `NON_NULL` wrapper. Callers go through the
    /// schema builder, which shares wrappers.
    pub(crate) fn wrapper(kind: TypeKind, of_type: Arc<Type>) -> Arc<Self> {
        Self::build(kind, None, None, TypeData::Wrapper { of_type })
    }

    fn build(kind: TypeKind, name: Option<String>, description: Option<String>, data: TypeData) -> Arc<Self> {
        Arc::new_cyclic(|this| Type {
            kind,
            name,
            description,
            data,
            object: type_object(this),
        })
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Returns the name; wrappers have none.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the wrapped type of a `LIST` or `NON_NULL`.
    pub fn of_type(&self) -> Option<&Arc<Type>> {
        match &self.data {
            TypeData::Wrapper { of_type } => Some(of_type),
            _ => None,
        }
    }

    /// Returns the fields of an object or interface, deprecated ones included.
    pub fn fields(&self) -> &[Arc<Field>] {
        match &self.data {
            TypeData::Object { fields, .. } | TypeData::Interface { fields, .. } => slice(fields),
            _ => &[],
        }
    }

    /// Returns the values of an enum, deprecated ones included.
    pub fn enum_values(&self) -> &[Arc<EnumValue>] {
        match &self.data {
            TypeData::Enum { values } => slice(values),
            _ => &[],
        }
    }

    /// Returns the fields of an input object.
    pub fn input_fields(&self) -> &[Arc<InputValue>] {
        match &self.data {
            TypeData::InputObject { fields } => slice(fields),
            _ => &[],
        }
    }

    /// Sets the fields of an object or interface.
    pub fn add_fields(&self, fields: Vec<Arc<Field>>) -> SchemaResult<()> {
        match &self.data {
            TypeData::Object { fields: slot, .. } | TypeData::Interface { fields: slot, .. } => {
                self.set_once(slot, fields, "fields")
            }
            _ => Err(self.not_applicable("fields")),
        }
    }

    /// Sets the interfaces an object implements.
    pub fn add_interfaces(&self, interfaces: &[Arc<Type>]) -> SchemaResult<()> {
        match &self.data {
            TypeData::Object { interfaces: slot, .. } => {
                self.set_once(slot, interfaces.iter().map(Arc::downgrade).collect(), "interfaces")
            }
            _ => Err(self.not_applicable("interfaces")),
        }
    }

    /// Sets the possible types of an interface or union.
    pub fn add_possible_types(&self, possible_types: &[Arc<Type>]) -> SchemaResult<()> {
        match &self.data {
            TypeData::Interface { possible_types: slot, .. } | TypeData::Union { possible_types: slot } => {
                self.set_once(slot, possible_types.iter().map(Arc::downgrade).collect(), "possible types")
            }
            _ => Err(self.not_applicable("possible types")),
        }
    }

    /// Sets the values of an enum.
    pub fn add_enum_values(&self, values: Vec<Arc<EnumValue>>) -> SchemaResult<()> {
        match &self.data {
            TypeData::Enum { values: slot } => self.set_once(slot, values, "enum values"),
            _ => Err(self.not_applicable("enum values")),
        }
    }

    /// Sets the fields of an input object.
    pub fn add_input_values(&self, fields: Vec<Arc<InputValue>>) -> SchemaResult<()> {
        match &self.data {
            TypeData::InputObject { fields: slot } => self.set_once(slot, fields, "input fields"),
            _ => Err(self.not_applicable("input fields")),
        }
    }

    fn set_once<T>(&self, slot: &OnceLock<T>, value: T, what: &str) -> SchemaResult<()> {
        slot.set(value)
            .map_err(|_| SchemaError::new(format!("The {what} of {self} are already set")))
    }

    fn not_applicable(&self, what: &str) -> SchemaError {
        SchemaError::new(format!("{} types have no {what}: {self}", self.kind))
    }
}

fn slice<T>(slot: &OnceLock<Vec<T>>) -> &[T] {
    slot.get().map(Vec::as_slice).unwrap_or_default()
}

fn upgrade_all(types: &OnceLock<Vec<Weak<Type>>>) -> SchemaResult<Vec<Arc<dyn TypeFields>>> {
    slice(types)
        .iter()
        .map(|ty| {
            ty.upgrade()
                .map(|ty| ty as Arc<dyn TypeFields>)
                .ok_or_else(|| SchemaError::new("Referenced type is not registered in the schema"))
        })
        .collect()
}

/// Renders the type reference: `Int`, `[Int]`, `Int!`.
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.data, self.kind) {
            (TypeData::Wrapper { of_type }, TypeKind::List) => write!(f, "[{of_type}]"),
            (TypeData::Wrapper { of_type }, _) => write!(f, "{of_type}!"),
            _ => f.write_str(self.name.as_deref().unwrap_or_default()),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Type")
            .field("kind", &self.kind)
            .field("type", &self.to_string())
            .finish()
    }
}

impl AsObject for Type {
    fn object(&self) -> &Object {
        &self.object
    }
}

#[async_trait]
impl TypeFields for Type {
    async fn get_kind(&self, _params: FieldParams) -> SchemaResult<TypeKind> {
        Ok(self.kind)
    }

    async fn get_name(&self, _params: FieldParams) -> SchemaResult<Option<String>> {
        Ok(self.name.clone())
    }

    async fn get_description(&self, _params: FieldParams) -> SchemaResult<Option<String>> {
        Ok(self.description.clone())
    }

    async fn get_fields(
        &self,
        _params: FieldParams,
        include_deprecated: Option<bool>,
    ) -> SchemaResult<Option<Vec<Arc<dyn FieldFields>>>> {
        let (TypeData::Object { fields, .. } | TypeData::Interface { fields, .. }) = &self.data else {
            return Ok(None);
        };
        let include_deprecated = include_deprecated.unwrap_or(false);

        Ok(Some(
            slice(fields)
                .iter()
                .filter(|field| include_deprecated || !field.is_deprecated())
                .map(|field| Arc::clone(field) as Arc<dyn FieldFields>)
                .collect(),
        ))
    }

    async fn get_interfaces(&self, _params: FieldParams) -> SchemaResult<Option<Vec<Arc<dyn TypeFields>>>> {
        match &self.data {
            TypeData::Object { interfaces, .. } => upgrade_all(interfaces).map(Some),
            _ => Ok(None),
        }
    }

    async fn get_possible_types(&self, _params: FieldParams) -> SchemaResult<Option<Vec<Arc<dyn TypeFields>>>> {
        match &self.data {
            TypeData::Interface { possible_types, .. } | TypeData::Union { possible_types } => {
                upgrade_all(possible_types).map(Some)
            }
            _ => Ok(None),
        }
    }

    async fn get_enum_values(
        &self,
        _params: FieldParams,
        include_deprecated: Option<bool>,
    ) -> SchemaResult<Option<Vec<Arc<dyn EnumValueFields>>>> {
        let TypeData::Enum { values } = &self.data else {
            return Ok(None);
        };
        let include_deprecated = include_deprecated.unwrap_or(false);

        Ok(Some(
            slice(values)
                .iter()
                .filter(|value| include_deprecated || !value.is_deprecated())
                .map(|value| Arc::clone(value) as Arc<dyn EnumValueFields>)
                .collect(),
        ))
    }

    async fn get_input_fields(&self, _params: FieldParams) -> SchemaResult<Option<Vec<Arc<dyn InputValueFields>>>> {
        match &self.data {
            TypeData::InputObject { fields } => Ok(Some(
                slice(fields)
                    .iter()
                    .map(|field| Arc::clone(field) as Arc<dyn InputValueFields>)
                    .collect(),
            )),
            _ => Ok(None),
        }
    }

    async fn get_of_type(&self, _params: FieldParams) -> SchemaResult<Option<Arc<dyn TypeFields>>> {
        Ok(self.of_type().map(|of_type| Arc::clone(of_type) as Arc<dyn TypeFields>))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlcore_service::SelectionSetParams;

    fn params() -> FieldParams {
        FieldParams::new(SelectionSetParams::default(), gqlcore_response::Value::new(gqlcore_response::Type::Map))
    }

    #[test]
    fn test_wrapper_kinds_cannot_be_named() {
        let err = Type::named(TypeKind::NonNull, "Int", None).unwrap_err();
        assert_eq!(err.messages(), ["NON_NULL types cannot be named"]);
    }

    #[test]
    fn test_display() {
        let int = Type::named(TypeKind::Scalar, "Int", None).unwrap();
        let non_null = Type::wrapper(TypeKind::NonNull, Arc::clone(&int));
        let list = Type::wrapper(TypeKind::List, non_null);

        assert_eq!(int.to_string(), "Int");
        assert_eq!(list.to_string(), "[Int!]");
        assert_eq!(list.name(), None);
        assert_eq!(list.of_type().map(|t| t.to_string()), Some("Int!".to_string()));
    }

    #[test]
    fn test_lists_are_set_once() {
        let query = Type::named(TypeKind::Object, "Query", None).unwrap();
        let string = Type::named(TypeKind::Scalar, "String", None).unwrap();

        query.add_fields(vec![Field::builder("hello", &string).build()]).unwrap();
        let err = query.add_fields(Vec::new()).unwrap_err();

        assert_eq!(err.messages(), ["The fields of Query are already set"]);
        assert_eq!(query.fields().len(), 1);
    }

    #[test]
    fn test_lists_need_matching_kind() {
        let string = Type::named(TypeKind::Scalar, "String", None).unwrap();

        let err = string.add_enum_values(Vec::new()).unwrap_err();
        assert_eq!(err.messages(), ["SCALAR types have no enum values: String"]);
        assert!(string.add_fields(Vec::new()).is_err());
        assert!(string.add_possible_types(&[]).is_err());
    }

    #[tokio::test]
    async fn test_deprecated_fields_are_filtered() {
        let query = Type::named(TypeKind::Object, "Query", None).unwrap();
        let string = Type::named(TypeKind::Scalar, "String", None).unwrap();
        query
            .add_fields(vec![
                Field::builder("current", &string).build(),
                Field::builder("legacy", &string).deprecated("Use current").build(),
            ])
            .unwrap();

        let count = |fields: Option<Vec<Arc<dyn FieldFields>>>| fields.map(|f| f.len());
        assert_eq!(count(query.get_fields(params(), None).await.unwrap()), Some(1));
        assert_eq!(count(query.get_fields(params(), Some(false)).await.unwrap()), Some(1));
        assert_eq!(count(query.get_fields(params(), Some(true)).await.unwrap()), Some(2));
        assert!(string.get_fields(params(), None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_interfaces_are_weak() {
        let node = Type::named(TypeKind::Interface, "Node", None).unwrap();
        let user = Type::named(TypeKind::Object, "User", None).unwrap();
        user.add_interfaces(&[Arc::clone(&node)]).unwrap();
        node.add_possible_types(&[Arc::clone(&user)]).unwrap();

        let interfaces = user.get_interfaces(params()).await.unwrap().unwrap();
        assert_eq!(interfaces.len(), 1);
        drop(interfaces);

        drop(node);
        assert!(user.get_interfaces(params()).await.is_err());
    }
}
