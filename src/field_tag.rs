use graphql_parser::query::{parse_query, Definition, OperationDefinition, Selection, Value};

use crate::schema::ArgumentValue;

pub(crate) struct FieldTag {
    pub alias: Option<String>,
    pub name: String,
    pub arguments: Vec<(String, ArgumentValue)>,
}

/// Parses a single field, as it would appear inside a selection set.
pub(crate) fn parse(tag: &str) -> Result<FieldTag, String> {
    let source = format!("{{ {tag} }}");
    let document = parse_query::<String>(&source).map_err(|error| error.to_string())?;

    let mut definitions = document.definitions.into_iter();
    let selection_set = match (definitions.next(), definitions.next()) {
        (Some(Definition::Operation(OperationDefinition::SelectionSet(set))), None) => set,
        _ => return Err(format!("`{tag}` is not a single field")),
    };

    let mut items = selection_set.items.into_iter();
    let field = match (items.next(), items.next()) {
        (Some(Selection::Field(field)), None) => field,
        _ => return Err(format!("`{tag}` is not a single field")),
    };

    if !field.selection_set.items.is_empty() {
        return Err("nested selections come from the field type".to_string());
    }
    if !field.directives.is_empty() {
        return Err("directives are not supported".to_string());
    }

    Ok(FieldTag {
        alias: field.alias,
        name: field.name,
        arguments: field
            .arguments
            .into_iter()
            .map(|(name, value)| (name, to_argument_value(value)))
            .collect(),
    })
}

fn to_argument_value(value: Value<'_, String>) -> ArgumentValue {
    match value {
        Value::Variable(name) => ArgumentValue::Variable(name),
        Value::Int(number) => match number.as_i64() {
            Some(int) => ArgumentValue::Int(int),
            None => ArgumentValue::Null,
        },
        Value::Float(float) => ArgumentValue::Float(float),
        Value::String(string) => ArgumentValue::String(string),
        Value::Boolean(boolean) => ArgumentValue::Boolean(boolean),
        Value::Null => ArgumentValue::Null,
        Value::Enum(name) => ArgumentValue::Enum(name),
        Value::List(items) => ArgumentValue::List(items.into_iter().map(to_argument_value).collect()),
        Value::Object(entries) => ArgumentValue::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key, to_argument_value(value)))
                .collect(),
        ),
    }
}
