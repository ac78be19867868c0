//! Solution components and the plugin steps among them.

use uuid::Uuid;
use crate::dataverse::{ColumnSet, ConditionExpression, ConditionOperator, Entity, QueryExpression};

pub const SOLUTION_COMPONENT: &str = "solutioncomponent";
pub const COMPONENT_TYPE: &str = "componenttype";
pub const OBJECT_ID: &str = "objectid";
pub const SOLUTION_ID: &str = "solutionid";
/// Unique name of the parent solution, reached through the `solutionid` lookup.
pub const SOLUTION_UNIQUE_NAME: &str = "solutionid/uniquename";

pub const SDK_MESSAGE_PROCESSING_STEP: &str = "sdkmessageprocessingstep";

/// `componenttype` choice value for an SDK Message Processing Step, i.e. a plugin step.
pub const PLUGIN_STEP_COMPONENT_TYPE: i64 = 92;

/// One row of `solutioncomponent`, typed at the query boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionComponent {
    /// `None` when the attribute is absent or not an integer choice value.
    pub component_type: Option<i64>,
    /// Raw object id; only plugin steps are required to carry a GUID here.
    pub object_id: Option<String>,
    pub solution_id: Option<String>,
}

impl SolutionComponent {
    pub fn from_entity(entity: &Entity) -> Self {
        let text = |attribute: &str| {
            entity.get(attribute).map(|v| match v.as_str() {
                Some(s) => s.to_string(),
                None => v.to_string(),
            })
        };

        Self {
            component_type: entity.get(COMPONENT_TYPE).and_then(|v| v.as_i64()),
            object_id: text(OBJECT_ID),
            solution_id: text(SOLUTION_ID),
        }
    }

    pub fn is_plugin_step(&self) -> bool {
        self.component_type == Some(PLUGIN_STEP_COMPONENT_TYPE)
    }
}

/// A plugin step with a usable id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginStep {
    pub id: Uuid,
}

impl PluginStep {
    /// `None` when the component's object id is missing or not a GUID.
    pub fn from_component(component: &SolutionComponent) -> Option<Self> {
        let raw = component.object_id.as_deref()?;
        Uuid::parse_str(raw.trim()).ok().map(|id| Self { id })
    }
}

/// Every component in the solution with the given unique name.
pub fn components_in_solution_query(solution_unique_name: &str) -> QueryExpression {
    let mut query = QueryExpression::new(SOLUTION_COMPONENT);
    query.column_set = ColumnSet::new()
        .lookup(SOLUTION_ID)
        .attribute(COMPONENT_TYPE)
        .attribute(OBJECT_ID);
    query.criteria.add_condition(ConditionExpression::new(
        SOLUTION_UNIQUE_NAME,
        ConditionOperator::Equal,
        solution_unique_name,
    ));
    query
}

/// Plugin steps among `components`, in the order they were returned.
pub fn plugin_steps_in_solution<'a>(
    components: &'a [SolutionComponent],
) -> impl Iterator<Item = &'a SolutionComponent> + 'a {
    components.iter().filter(|c| c.is_plugin_step())
}
