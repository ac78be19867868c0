use serde_json::Value;

/// Attributes to bring back. Lookups are tracked separately because the Web API
/// exposes them as `_<name>_value`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSet {
    pub attributes: Vec<String>,
    pub lookups: Vec<String>,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.attributes.push(name.to_string());
        self
    }

    pub fn lookup(mut self, name: &str) -> Self {
        self.lookups.push(name.to_string());
        self
    }

    fn select(&self) -> String {
        self.attributes
            .iter()
            .cloned()
            .chain(self.lookups.iter().map(|l| lookup_value_name(l)))
            .collect::<Vec<_>>()
            .join(",")
    }
}

pub fn lookup_value_name(lookup: &str) -> String {
    format!("_{}_value", lookup)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOperator {
    Equal,
}

impl ConditionOperator {
    fn as_odata(self) -> &'static str {
        match self {
            ConditionOperator::Equal => "eq",
        }
    }
}

/// `attribute` may be a navigation path such as `solutionid/uniquename`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionExpression {
    pub attribute: String,
    pub operator: ConditionOperator,
    pub value: Value,
}

impl ConditionExpression {
    pub fn new(attribute: &str, operator: ConditionOperator, value: impl Into<Value>) -> Self {
        Self {
            attribute: attribute.to_string(),
            operator,
            value: value.into(),
        }
    }

    fn to_odata(&self) -> String {
        format!("{} {} {}", self.attribute, self.operator.as_odata(), odata_literal(&self.value))
    }
}

/// Conditions joined with `and`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    pub conditions: Vec<ConditionExpression>,
}

impl FilterExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_condition(&mut self, condition: ConditionExpression) {
        self.conditions.push(condition);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryExpression {
    pub entity_name: String,
    pub column_set: ColumnSet,
    pub criteria: FilterExpression,
}

impl QueryExpression {
    pub fn new(entity_name: &str) -> Self {
        Self {
            entity_name: entity_name.to_string(),
            column_set: ColumnSet::default(),
            criteria: FilterExpression::default(),
        }
    }

    /// `$select`/`$filter` pairs for the entity set request.
    pub fn to_odata_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        let select = self.column_set.select();
        if !select.is_empty() {
            params.push(("$select", select));
        }
        if !self.criteria.conditions.is_empty() {
            let filter = self
                .criteria
                .conditions
                .iter()
                .map(ConditionExpression::to_odata)
                .collect::<Vec<_>>()
                .join(" and ");
            params.push(("$filter", filter));
        }
        params
    }
}

fn odata_literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
