//! Filter tree node definitions and the model lifecycle.

use crate::model::error::EditError;
use crate::predicate::Predicate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Stable identifier of a node within a model
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Logical operator combining a group's children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicalOperator {
    And,
    Or,
    Not,
    Xor,
    Nand,
    Nor,
    IfThen,
    IfThenElse,
    Implies,
    Biconditional,
    Custom,
}

impl LogicalOperator {
    /// Display string (also the JSON schema spelling)
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
            LogicalOperator::Not => "NOT",
            LogicalOperator::Xor => "XOR",
            LogicalOperator::Nand => "NAND",
            LogicalOperator::Nor => "NOR",
            LogicalOperator::IfThen => "IF_THEN",
            LogicalOperator::IfThenElse => "IF_THEN_ELSE",
            LogicalOperator::Implies => "IMPLIES",
            LogicalOperator::Biconditional => "BICONDITIONAL",
            LogicalOperator::Custom => "CUSTOM",
        }
    }

    /// Exact child count this operator requires, if constrained
    pub fn required_arity(&self) -> Option<usize> {
        match self {
            LogicalOperator::Not => Some(1),
            LogicalOperator::IfThen | LogicalOperator::Implies | LogicalOperator::Biconditional => {
                Some(2)
            }
            LogicalOperator::IfThenElse => Some(3),
            _ => None,
        }
    }

    /// AND-family operators: most-selective children first pays off
    pub fn is_and_family(&self) -> bool {
        matches!(self, LogicalOperator::And | LogicalOperator::Nand)
    }

    /// OR-family operators: least-selective children first pays off
    pub fn is_or_family(&self) -> bool {
        matches!(
            self,
            LogicalOperator::Or | LogicalOperator::Nor | LogicalOperator::Xor
        )
    }

    /// Whether child order carries meaning (conditionals, negation, custom
    /// combinators). Such groups must never be reordered.
    pub fn is_positional(&self) -> bool {
        self.required_arity().is_some() || matches!(self, LogicalOperator::Custom)
    }

    /// Identity element a zero-child group evaluates to.
    ///
    /// AND/NAND-family groups are vacuously true; OR/XOR/NOR-family groups
    /// are vacuously false. Keeping these fixed makes the optimizer's
    /// empty-group removal semantically safe.
    pub fn empty_group_value(&self) -> bool {
        !matches!(
            self,
            LogicalOperator::Or | LogicalOperator::Xor | LogicalOperator::Nor
        )
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_enabled() -> bool {
    true
}

/// Leaf node: one typed predicate applied to one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionNode {
    pub id: NodeId,
    pub column_id: String,
    pub predicate: Predicate,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Internal node: children combined under a logical operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupNode {
    pub id: NodeId,
    pub operator: LogicalOperator,
    #[serde(default)]
    pub children: Vec<FilterNode>,
    /// Registry key of the combinator for `CUSTOM` groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combinator: Option<String>,
}

/// Leaf node holding an opaque expression evaluated by an external engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormulaNode {
    pub id: NodeId,
    pub expression_text: String,
}

/// Leaf node produced by a natural-language interpreter.
///
/// Once an interpretation is attached the engine treats it as an ordinary
/// resolved subtree; until then the node evaluates fail-open (true).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NaturalNode {
    pub id: NodeId,
    pub query_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_interpretation: Option<Box<FilterNode>>,
}

/// One node of the filter tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterNode {
    Condition(ConditionNode),
    Group(GroupNode),
    Formula(FormulaNode),
    Natural(NaturalNode),
}

impl FilterNode {
    /// Build an enabled condition leaf
    pub fn condition(
        id: impl Into<NodeId>,
        column_id: impl Into<String>,
        predicate: impl Into<Predicate>,
    ) -> Self {
        FilterNode::Condition(ConditionNode {
            id: id.into(),
            column_id: column_id.into(),
            predicate: predicate.into(),
            enabled: true,
        })
    }

    /// Build a group node
    pub fn group(
        id: impl Into<NodeId>,
        operator: LogicalOperator,
        children: Vec<FilterNode>,
    ) -> Self {
        FilterNode::Group(GroupNode {
            id: id.into(),
            operator,
            children,
            combinator: None,
        })
    }

    /// Build a `CUSTOM` group bound to a registered combinator key
    pub fn custom_group(
        id: impl Into<NodeId>,
        combinator: impl Into<String>,
        children: Vec<FilterNode>,
    ) -> Self {
        FilterNode::Group(GroupNode {
            id: id.into(),
            operator: LogicalOperator::Custom,
            children,
            combinator: Some(combinator.into()),
        })
    }

    /// Build a formula leaf
    pub fn formula(id: impl Into<NodeId>, expression_text: impl Into<String>) -> Self {
        FilterNode::Formula(FormulaNode {
            id: id.into(),
            expression_text: expression_text.into(),
        })
    }

    /// Build an unresolved natural-language leaf
    pub fn natural(id: impl Into<NodeId>, query_text: impl Into<String>) -> Self {
        FilterNode::Natural(NaturalNode {
            id: id.into(),
            query_text: query_text.into(),
            parsed_interpretation: None,
        })
    }

    pub fn id(&self) -> &NodeId {
        match self {
            FilterNode::Condition(n) => &n.id,
            FilterNode::Group(n) => &n.id,
            FilterNode::Formula(n) => &n.id,
            FilterNode::Natural(n) => &n.id,
        }
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            FilterNode::Group(g) => Some(g),
            _ => None,
        }
    }

    /// A node is vacuous when it is a group whose children are all vacuous
    /// (in particular, an empty group). Vacuous children contribute nothing
    /// to their parent's result; the evaluator skips them and the optimizer
    /// removes them, which keeps the two in agreement.
    pub fn is_vacuous(&self) -> bool {
        match self {
            FilterNode::Group(g) => g.children.iter().all(FilterNode::is_vacuous),
            _ => false,
        }
    }

    /// Total node count of this subtree, including resolved natural-language
    /// interpretations
    pub fn node_count(&self) -> usize {
        match self {
            FilterNode::Group(g) => 1 + g.children.iter().map(FilterNode::node_count).sum::<usize>(),
            FilterNode::Natural(n) => {
                1 + n
                    .parsed_interpretation
                    .as_deref()
                    .map_or(0, FilterNode::node_count)
            }
            _ => 1,
        }
    }
}

/// Current epoch time in milliseconds
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A complete multi-condition filter bound to a target (e.g. a grid id).
///
/// The root is always a group, even when empty; the type enforces it.
/// Every accepted structural edit bumps `version` and refreshes
/// `modified_at`. Transformations (`optimize`, `from_json`) return new
/// models instead of mutating shared state, so a model may be read by any
/// number of evaluators while its successor is being built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiFilterModel {
    pub target_id: String,
    pub root: GroupNode,
    pub version: u32,
    #[serde(rename = "createdAt")]
    pub created_at: u64,
    #[serde(rename = "modifiedAt")]
    pub modified_at: u64,
}

impl MultiFilterModel {
    /// Factory: an empty model whose root is an empty AND group
    pub fn new(target_id: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            target_id: target_id.into(),
            root: GroupNode {
                id: NodeId::from("root"),
                operator: LogicalOperator::And,
                children: Vec::new(),
                combinator: None,
            },
            version: 1,
            created_at: now,
            modified_at: now,
        }
    }

    /// Total node count including the root group
    pub fn node_count(&self) -> usize {
        1 + self
            .root
            .children
            .iter()
            .map(FilterNode::node_count)
            .sum::<usize>()
    }

    /// Append a child to the group with the given id
    pub fn add_child(&mut self, parent_id: &str, node: FilterNode) -> Result<(), EditError> {
        let group = find_group_mut(&mut self.root, parent_id)
            .ok_or_else(|| EditError::GroupNotFound(parent_id.to_string()))?;
        group.children.push(node);
        self.touch();
        Ok(())
    }

    /// Remove a node (and its subtree) anywhere below the root
    pub fn remove_node(&mut self, id: &str) -> Result<FilterNode, EditError> {
        if self.root.id == id {
            return Err(EditError::CannotRemoveRoot);
        }
        match remove_from_group(&mut self.root, id) {
            Some(node) => {
                self.touch();
                Ok(node)
            }
            None => Err(EditError::NodeNotFound(id.to_string())),
        }
    }

    /// Move a child within a group from one position to another
    pub fn move_child(&mut self, group_id: &str, from: usize, to: usize) -> Result<(), EditError> {
        let group = find_group_mut(&mut self.root, group_id)
            .ok_or_else(|| EditError::GroupNotFound(group_id.to_string()))?;
        let len = group.children.len();
        if from >= len || to >= len {
            return Err(EditError::IndexOutOfBounds { index: from.max(to), len });
        }
        let node = group.children.remove(from);
        group.children.insert(to, node);
        self.touch();
        Ok(())
    }

    /// Change a group's logical operator
    pub fn set_operator(
        &mut self,
        group_id: &str,
        operator: LogicalOperator,
    ) -> Result<(), EditError> {
        let group = find_group_mut(&mut self.root, group_id)
            .ok_or_else(|| EditError::GroupNotFound(group_id.to_string()))?;
        group.operator = operator;
        self.touch();
        Ok(())
    }

    /// Replace a condition's predicate
    pub fn set_predicate(
        &mut self,
        condition_id: &str,
        predicate: impl Into<Predicate>,
    ) -> Result<(), EditError> {
        let condition = find_condition_mut(&mut self.root, condition_id)
            .ok_or_else(|| EditError::ConditionNotFound(condition_id.to_string()))?;
        condition.predicate = predicate.into();
        self.touch();
        Ok(())
    }

    /// Enable or disable a condition
    pub fn set_enabled(&mut self, condition_id: &str, enabled: bool) -> Result<(), EditError> {
        let condition = find_condition_mut(&mut self.root, condition_id)
            .ok_or_else(|| EditError::ConditionNotFound(condition_id.to_string()))?;
        condition.enabled = enabled;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.version += 1;
        self.modified_at = now_millis();
    }
}

fn find_group_mut<'a>(group: &'a mut GroupNode, id: &str) -> Option<&'a mut GroupNode> {
    if group.id == id {
        return Some(group);
    }
    for child in &mut group.children {
        if let FilterNode::Group(g) = child {
            if let Some(found) = find_group_mut(g, id) {
                return Some(found);
            }
        }
    }
    None
}

fn find_condition_mut<'a>(group: &'a mut GroupNode, id: &str) -> Option<&'a mut ConditionNode> {
    for child in &mut group.children {
        match child {
            FilterNode::Condition(c) if c.id == id => return Some(c),
            FilterNode::Group(g) => {
                if let Some(found) = find_condition_mut(g, id) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

fn remove_from_group(group: &mut GroupNode, id: &str) -> Option<FilterNode> {
    if let Some(pos) = group.children.iter().position(|c| c.id() == id) {
        return Some(group.children.remove(pos));
    }
    for child in &mut group.children {
        if let FilterNode::Group(g) = child {
            if let Some(removed) = remove_from_group(g, id) {
                return Some(removed);
            }
        }
    }
    None
}
