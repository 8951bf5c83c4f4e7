use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Edit instruction exactly as the language-model collaborator emits it.
///
/// Every field is optional on the wire; [`EditInstruction::try_from`] decides which
/// combinations are meaningful for the requested operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEditInstruction {
    pub operation: Option<String>,
    pub target: Option<String>,
    pub content_match: Option<String>,
    pub new_content: Option<String>,
    pub element_selector: Option<String>,
    pub component: Option<String>,
    pub properties: Option<Map<String, Value>>,
    pub context: Option<String>,
}

impl RawEditInstruction {
    /// String property lookup; blank values count as absent.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|props| props.get(key))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Modify,
    Remove,
    Insert,
    Move,
    Restructure,
    Image,
}

impl OperationKind {
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "modify" | "update" | "edit" | "replace" => Some(Self::Modify),
            "remove" | "delete" => Some(Self::Remove),
            "add" | "insert" => Some(Self::Insert),
            "move" | "relocate" => Some(Self::Move),
            "structure-update" | "structure" | "restructure" => Some(Self::Restructure),
            "image-update" | "image" => Some(Self::Image),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Modify => "modify",
            Self::Remove => "remove",
            Self::Insert => "insert",
            Self::Move => "move",
            Self::Restructure => "structure-update",
            Self::Image => "image-update",
        }
    }
}

/// How an element is pointed at: a CSS-like selector, its visible text, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementTarget {
    pub selector: Option<String>,
    pub content_match: Option<String>,
}

impl ElementTarget {
    pub fn new(selector: Option<String>, content_match: Option<String>) -> Self {
        Self {
            selector,
            content_match,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selector.is_none() && self.content_match.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    Before,
    After,
    /// First child of the anchor.
    Prepend,
    /// Last child of the anchor.
    Append,
}

impl InsertPosition {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "before" | "above" => Some(Self::Before),
            "after" | "below" | "underneath" => Some(Self::After),
            "prepend" | "start" | "inside-start" | "first" => Some(Self::Prepend),
            "append" | "end" | "inside-end" | "inside" | "last" => Some(Self::Append),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyEdit {
    pub content_match: Option<String>,
    pub new_content: String,
    pub selector: Option<String>,
    /// Free-text description of what is being changed ("the CTA button").
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveEdit {
    pub selector: Option<String>,
    pub content_match: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertEdit {
    pub new_content: String,
    pub anchor: Option<ElementTarget>,
    pub position: InsertPosition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveEdit {
    pub source: ElementTarget,
    pub anchor: ElementTarget,
    pub position: InsertPosition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestructureEdit {
    pub target: ElementTarget,
    pub new_content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEdit {
    pub target: ElementTarget,
    pub src: Option<String>,
    pub alt: Option<String>,
}

/// One operation, carrying only the fields that operation uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    Modify(ModifyEdit),
    Remove(RemoveEdit),
    Insert(InsertEdit),
    Move(MoveEdit),
    Restructure(RestructureEdit),
    Image(ImageEdit),
}

impl EditOp {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Modify(_) => OperationKind::Modify,
            Self::Remove(_) => OperationKind::Remove,
            Self::Insert(_) => OperationKind::Insert,
            Self::Move(_) => OperationKind::Move,
            Self::Restructure(_) => OperationKind::Restructure,
            Self::Image(_) => OperationKind::Image,
        }
    }
}

/// A validated edit instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditInstruction {
    pub component: Option<String>,
    pub target: Option<String>,
    pub op: EditOp,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("instruction has no operation")]
    MissingOperation,

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("{operation} requires `{field}`")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[error("{operation} needs an element selector, contentMatch or context to locate its target")]
    MissingTarget { operation: &'static str },

    #[error("invalid property `{key}`: {reason}")]
    InvalidProperty { key: String, reason: String },
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn position_property(
    raw: &RawEditInstruction,
    default: InsertPosition,
) -> Result<InsertPosition, ValidationError> {
    match raw.property("position") {
        None => Ok(default),
        Some(value) => InsertPosition::parse(value).ok_or_else(|| ValidationError::InvalidProperty {
            key: "position".to_string(),
            reason: format!("unsupported position `{value}`"),
        }),
    }
}

impl TryFrom<RawEditInstruction> for EditInstruction {
    type Error = ValidationError;

    fn try_from(raw: RawEditInstruction) -> Result<Self, Self::Error> {
        let operation = raw
            .operation
            .as_deref()
            .filter(|op| !op.trim().is_empty())
            .ok_or(ValidationError::MissingOperation)?;
        let kind = OperationKind::parse(operation)
            .ok_or_else(|| ValidationError::UnknownOperation(operation.to_string()))?;

        let selector = present(&raw.element_selector);
        let content_match = present(&raw.content_match);
        let target_text = present(&raw.target);
        let hint = present(&raw.context).or_else(|| target_text.clone());
        let label = kind.as_str();

        let op = match kind {
            OperationKind::Modify => {
                let new_content = raw.new_content.clone().ok_or(ValidationError::MissingField {
                    operation: label,
                    field: "newContent",
                })?;
                if selector.is_none() && content_match.is_none() && hint.is_none() {
                    return Err(ValidationError::MissingTarget { operation: label });
                }
                EditOp::Modify(ModifyEdit {
                    content_match,
                    new_content,
                    selector,
                    hint,
                })
            }
            OperationKind::Remove => {
                if selector.is_none() && content_match.is_none() {
                    return Err(ValidationError::MissingTarget { operation: label });
                }
                EditOp::Remove(RemoveEdit {
                    selector,
                    content_match,
                })
            }
            OperationKind::Insert => {
                let new_content = present(&raw.new_content).ok_or(ValidationError::MissingField {
                    operation: label,
                    field: "newContent",
                })?;
                let anchor = ElementTarget::new(
                    selector.or_else(|| raw.property("anchorSelector").map(str::to_string)),
                    content_match.or_else(|| raw.property("anchor").map(str::to_string)),
                );
                let anchor = (!anchor.is_empty()).then_some(anchor);
                let default = if anchor.is_some() {
                    InsertPosition::After
                } else {
                    InsertPosition::Append
                };
                EditOp::Insert(InsertEdit {
                    new_content,
                    anchor,
                    position: position_property(&raw, default)?,
                })
            }
            OperationKind::Move => {
                let source = ElementTarget::new(selector, content_match);
                if source.is_empty() {
                    return Err(ValidationError::MissingTarget { operation: label });
                }
                let anchor = ElementTarget::new(
                    raw.property("anchorSelector").map(str::to_string),
                    raw.property("anchor").map(str::to_string),
                );
                if anchor.is_empty() {
                    return Err(ValidationError::MissingField {
                        operation: label,
                        field: "properties.anchor",
                    });
                }
                EditOp::Move(MoveEdit {
                    source,
                    anchor,
                    position: position_property(&raw, InsertPosition::After)?,
                })
            }
            OperationKind::Restructure => {
                let target = ElementTarget::new(selector, content_match);
                if target.is_empty() {
                    return Err(ValidationError::MissingTarget { operation: label });
                }
                let new_content = present(&raw.new_content).ok_or(ValidationError::MissingField {
                    operation: label,
                    field: "newContent",
                })?;
                EditOp::Restructure(RestructureEdit {
                    target,
                    new_content,
                })
            }
            OperationKind::Image => {
                let src = raw
                    .property("src")
                    .map(str::to_string)
                    .or_else(|| present(&raw.new_content));
                let alt = raw.property("alt").map(str::to_string);
                if src.is_none() && alt.is_none() {
                    return Err(ValidationError::MissingField {
                        operation: label,
                        field: "properties.src",
                    });
                }
                EditOp::Image(ImageEdit {
                    target: ElementTarget::new(selector, content_match),
                    src,
                    alt,
                })
            }
        };

        Ok(Self {
            component: present(&raw.component),
            target: target_text,
            op,
        })
    }
}
