use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::corrector::{DuplicateIdCorrector, Owner};
use super::error::{Result, TaxonomyError};
use super::grades;
use super::kind::Kind;
use super::xml::{ENTRY_TAG, Element, XmlNode};
use super::{DocumentId, NodeId};

pub const ID_ATTRIBUTES: [&str; 2] = ["RefID", "RefId"];
pub const RELATED_ITEMS_PATH: &str = "RelatedLearningStandardItems/LearningStandardItemRefId";
pub const RELATIONSHIP_TYPE_ATTRIBUTE: &str = "RelationshipType";
pub const CHILD_OF: &str = "childOf";
pub const PREDECESSOR_ITEMS_PATH: &str = "PredecessorItems/LearningStandardItemRefId";
pub const CODE_PATH: &str = "StatementCodes/StatementCode";
pub const STATEMENT_PATH: &str = "Statements/Statement";
pub const GRADE_PATH: &str = "GradeLevels/GradeLevel";

/// Raw parent reference marking a node that is unlinked on purpose.
pub const UNLINKED_SENTINEL: &str = "INTENTIONALLYORPHANED";

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"not applicable|begins in grade [0-9]+").expect("placeholder regex is valid")
});

/// One taxonomy entry. The reference id is fixed at construction; the parent
/// reference and descriptive fields are derived on first use and cached,
/// absent values included.
#[derive(Debug)]
pub struct Node {
    owner: Owner,
    kind: Kind,
    fragment: Element,
    raw_reference_id: String,
    reference_id: String,
    parent_reference_id: OnceCell<Option<String>>,
    code: OnceCell<Option<String>>,
    statement: OnceCell<Option<String>>,
    grades: OnceCell<BTreeSet<String>>,
    parent: Option<NodeId>,
    children: BTreeMap<String, NodeId>,
}

impl Node {
    pub fn new(
        owner: Owner,
        kind: Kind,
        fragment: Element,
        corrector: &mut DuplicateIdCorrector,
    ) -> Result<Self> {
        if !fragment.is_tag(ENTRY_TAG) {
            return Err(TaxonomyError::NotAnEntry);
        }

        let raw_reference_id = fragment
            .first_attribute(&ID_ATTRIBUTES)
            .ok_or_else(|| TaxonomyError::MissingAttribute(ID_ATTRIBUTES.join(" or ")))?;
        let reference_id = corrector.correct_id(owner, &raw_reference_id);

        Ok(Self {
            owner,
            kind,
            fragment,
            raw_reference_id,
            reference_id,
            parent_reference_id: OnceCell::new(),
            code: OnceCell::new(),
            statement: OnceCell::new(),
            grades: OnceCell::new(),
            parent: None,
            children: BTreeMap::new(),
        })
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn document(&self) -> DocumentId {
        self.owner.document
    }

    pub fn reference_id(&self) -> &str {
        &self.reference_id
    }

    pub fn raw_reference_id(&self) -> &str {
        &self.raw_reference_id
    }

    /// Parent reference as written: the first `childOf` relationship of the
    /// new schema, else the first predecessor item of the old schema.
    pub fn raw_parent_reference_id(&self) -> Option<String> {
        self.fragment
            .markers(RELATED_ITEMS_PATH, RELATIONSHIP_TYPE_ATTRIBUTE)
            .into_iter()
            .find(|marker| marker.relationship.as_deref() == Some(CHILD_OF))
            .map(|marker| marker.target)
            .or_else(|| self.fragment.first_text(PREDECESSOR_ITEMS_PATH))
    }

    pub fn parent_reference_id(&self, corrector: &mut DuplicateIdCorrector) -> Option<&str> {
        self.parent_reference_id
            .get_or_init(|| {
                self.raw_parent_reference_id()
                    .map(|raw| corrector.correct_parent(self.owner, &raw))
            })
            .as_deref()
    }

    /// Corrected parent reference, once the linking pass has derived it.
    pub fn resolved_parent_reference_id(&self) -> Option<&str> {
        self.parent_reference_id.get().and_then(Option::as_deref)
    }

    pub fn is_deliberately_unlinked(&self) -> bool {
        self.raw_parent_reference_id().as_deref() == Some(UNLINKED_SENTINEL)
    }

    pub fn code(&self) -> Result<&str> {
        self.code
            .get_or_init(|| self.fragment.first_text(CODE_PATH))
            .as_deref()
            .ok_or_else(|| TaxonomyError::MissingField(CODE_PATH.to_string()))
    }

    pub fn statement(&self) -> Result<&str> {
        self.statement
            .get_or_init(|| self.fragment.first_text(STATEMENT_PATH))
            .as_deref()
            .ok_or_else(|| TaxonomyError::MissingField(STATEMENT_PATH.to_string()))
    }

    pub fn grades(&self) -> &BTreeSet<String> {
        self.grades.get_or_init(|| {
            let tokens = self.fragment.texts(GRADE_PATH);
            grades::expand_all(tokens.iter().map(String::as_str))
        })
    }

    pub fn valid_grades(&self) -> bool {
        grades::is_valid_grade_set(self.grades())
    }

    /// Content-free placeholder: no id of its own and a statement saying the
    /// entry does not apply. Such nodes are kept but not validated.
    pub fn is_illegitimate(&self) -> bool {
        if !self.raw_reference_id.is_empty() {
            return false;
        }
        self.statement()
            .map(|statement| PLACEHOLDER_RE.is_match(statement))
            .unwrap_or(false)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &BTreeMap<String, NodeId> {
        &self.children
    }

    /// Declares a parent reference that the linking pass could not resolve.
    pub fn is_orphan(&self) -> bool {
        self.resolved_parent_reference_id().is_some()
            && self.parent.is_none()
            && !self.is_deliberately_unlinked()
    }

    pub(super) fn add_child(&mut self, reference_id: String, child: NodeId) {
        self.children.insert(reference_id, child);
    }

    pub(super) fn set_parent(&mut self, parent: NodeId) {
        self.parent = Some(parent);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} ref_id: {}, parent_ref_id: {}, code: {}, statement: {}, grades: {}>",
            self.kind,
            self.reference_id,
            self.resolved_parent_reference_id().unwrap_or(""),
            self.code().unwrap_or(""),
            self.statement().unwrap_or(""),
            self.grades().iter().cloned().collect::<Vec<String>>().join(",")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::xml::parse_entries;

    fn fragment(xml: &str) -> Element {
        parse_entries("fixture.xml", xml)
            .unwrap()
            .into_iter()
            .next()
            .expect("fixture has one entry")
    }

    fn build(xml: &str, corrector: &mut DuplicateIdCorrector, node: usize) -> Result<Node> {
        let owner = Owner {
            node: NodeId(node),
            document: DocumentId(0),
        };
        Node::new(owner, Kind::Standard, fragment(xml), corrector)
    }

    #[test]
    fn reference_id_prefers_new_attribute_and_trims() {
        let mut corrector = DuplicateIdCorrector::new();
        let node = build(
            r#"<LearningStandardItem RefID=" N1 " RefId="old"/>"#,
            &mut corrector,
            0,
        )
        .unwrap();
        assert_eq!(node.reference_id(), "N1");

        let old = build(r#"<LearningStandardItem RefId="O1"/>"#, &mut corrector, 1).unwrap();
        assert_eq!(old.reference_id(), "O1");
    }

    #[test]
    fn missing_id_attribute_is_reported() {
        let mut corrector = DuplicateIdCorrector::new();
        let err = build("<LearningStandardItem/>", &mut corrector, 0).unwrap_err();
        assert!(matches!(err, TaxonomyError::MissingAttribute(_)));
    }

    #[test]
    fn duplicate_raw_ids_are_renamed_on_construction() {
        let mut corrector = DuplicateIdCorrector::new();
        let first = build(r#"<LearningStandardItem RefID="D"/>"#, &mut corrector, 0).unwrap();
        let second = build(r#"<LearningStandardItem RefID="D"/>"#, &mut corrector, 1).unwrap();
        assert_eq!(first.reference_id(), "D");
        assert_ne!(second.reference_id(), "D");
        assert_eq!(second.raw_reference_id(), "D");
    }

    #[test]
    fn new_schema_child_of_wins_over_predecessor() {
        let mut corrector = DuplicateIdCorrector::new();
        let node = build(
            r#"<LearningStandardItem RefID="C">
                 <RelatedLearningStandardItems>
                   <LearningStandardItemRefId RelationshipType="parentOf">X</LearningStandardItemRefId>
                   <LearningStandardItemRefId RelationshipType="childOf"> P </LearningStandardItemRefId>
                   <LearningStandardItemRefId RelationshipType="childOf">Q</LearningStandardItemRefId>
                 </RelatedLearningStandardItems>
                 <PredecessorItems><LearningStandardItemRefId>OLD</LearningStandardItemRefId></PredecessorItems>
               </LearningStandardItem>"#,
            &mut corrector,
            0,
        )
        .unwrap();
        assert!(node.resolved_parent_reference_id().is_none());
        assert_eq!(node.parent_reference_id(&mut corrector), Some("P"));
        assert_eq!(node.resolved_parent_reference_id(), Some("P"));
    }

    #[test]
    fn old_schema_predecessor_is_the_fallback() {
        let mut corrector = DuplicateIdCorrector::new();
        let node = build(
            r#"<LearningStandardItem RefId="C">
                 <RelatedLearningStandardItems>
                   <LearningStandardItemRefId RelationshipType="parentOf">X</LearningStandardItemRefId>
                 </RelatedLearningStandardItems>
                 <PredecessorItems>
                   <LearningStandardItemRefId>OLD</LearningStandardItemRefId>
                   <LearningStandardItemRefId>OLDER</LearningStandardItemRefId>
                 </PredecessorItems>
               </LearningStandardItem>"#,
            &mut corrector,
            0,
        )
        .unwrap();
        assert_eq!(node.parent_reference_id(&mut corrector), Some("OLD"));
    }

    #[test]
    fn absent_parent_reference_is_cached() {
        let mut corrector = DuplicateIdCorrector::new();
        let node = build(r#"<LearningStandardItem RefID="R"/>"#, &mut corrector, 0).unwrap();
        assert_eq!(node.parent_reference_id(&mut corrector), None);
        assert!(node.parent_reference_id.get().is_some());
        assert!(!node.is_orphan());
    }

    #[test]
    fn descriptive_fields_and_grades() {
        let mut corrector = DuplicateIdCorrector::new();
        let node = build(
            r#"<LearningStandardItem RefID="S">
                 <StatementCodes><StatementCode> CCSS.Math.Content.3.OA.A.1 </StatementCode></StatementCodes>
                 <Statements><Statement>Interpret products of whole numbers.</Statement></Statements>
                 <GradeLevels><GradeLevel>3-5</GradeLevel><GradeLevel>K</GradeLevel></GradeLevels>
               </LearningStandardItem>"#,
            &mut corrector,
            0,
        )
        .unwrap();
        assert_eq!(node.code().unwrap(), "CCSS.Math.Content.3.OA.A.1");
        assert_eq!(node.statement().unwrap(), "Interpret products of whole numbers.");
        assert_eq!(
            node.grades().iter().map(String::as_str).collect::<Vec<&str>>(),
            vec!["03", "04", "05", "K"]
        );
        assert!(node.valid_grades());
    }

    #[test]
    fn display_summarizes_the_node() {
        let mut corrector = DuplicateIdCorrector::new();
        let node = build(
            r#"<LearningStandardItem RefID="S">
                 <PredecessorItems><LearningStandardItemRefId>C</LearningStandardItemRefId></PredecessorItems>
                 <StatementCodes><StatementCode>CCSS.1</StatementCode></StatementCodes>
                 <Statements><Statement>Count to 100.</Statement></Statements>
                 <GradeLevels><GradeLevel>K</GradeLevel><GradeLevel>1</GradeLevel></GradeLevels>
               </LearningStandardItem>"#,
            &mut corrector,
            0,
        )
        .unwrap();
        assert_eq!(
            node.to_string(),
            "<standard ref_id: S, parent_ref_id: , code: CCSS.1, statement: Count to 100., grades: 01,K>"
        );

        assert_eq!(node.parent_reference_id(&mut corrector), Some("C"));
        assert!(node.to_string().contains("parent_ref_id: C,"));
    }

    #[test]
    fn missing_descriptive_fields_are_errors() {
        let mut corrector = DuplicateIdCorrector::new();
        let node = build(r#"<LearningStandardItem RefID="S"/>"#, &mut corrector, 0).unwrap();
        assert!(matches!(node.code(), Err(TaxonomyError::MissingField(_))));
        assert!(matches!(node.statement(), Err(TaxonomyError::MissingField(_))));
        assert!(node.grades().is_empty());
        assert!(node.valid_grades());
    }

    #[test]
    fn invalid_grade_tokens_fail_validation() {
        let mut corrector = DuplicateIdCorrector::new();
        let node = build(
            r#"<LearningStandardItem RefID="S"><GradeLevels><GradeLevel>PK</GradeLevel></GradeLevels></LearningStandardItem>"#,
            &mut corrector,
            0,
        )
        .unwrap();
        assert!(!node.valid_grades());
    }

    #[test]
    fn placeholders_without_ids_are_illegitimate() {
        let mut corrector = DuplicateIdCorrector::new();
        let not_applicable = build(
            r#"<LearningStandardItem RefID=" "><Statements><Statement>Standard not applicable to this grade.</Statement></Statements></LearningStandardItem>"#,
            &mut corrector,
            0,
        )
        .unwrap();
        let begins_later = build(
            r#"<LearningStandardItem RefID=""><Statements><Statement>This standard begins in grade 4</Statement></Statements></LearningStandardItem>"#,
            &mut corrector,
            1,
        )
        .unwrap();
        let capitalized = build(
            r#"<LearningStandardItem RefID=""><Statements><Statement>Not Applicable</Statement></Statements></LearningStandardItem>"#,
            &mut corrector,
            2,
        )
        .unwrap();
        let with_id = build(
            r#"<LearningStandardItem RefID="X"><Statements><Statement>not applicable</Statement></Statements></LearningStandardItem>"#,
            &mut corrector,
            3,
        )
        .unwrap();

        assert!(not_applicable.is_illegitimate());
        assert!(begins_later.is_illegitimate());
        assert_ne!(begins_later.reference_id(), not_applicable.reference_id());
        assert!(!capitalized.is_illegitimate());
        assert!(!with_id.is_illegitimate());
    }

    #[test]
    fn child_map_is_keyed_by_reference_id_and_idempotent() {
        let mut corrector = DuplicateIdCorrector::new();
        let mut node = build(r#"<LearningStandardItem RefID="P"/>"#, &mut corrector, 0).unwrap();
        node.add_child("C".to_string(), NodeId(1));
        node.add_child("C".to_string(), NodeId(1));
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.children().get("C"), Some(&NodeId(1)));
    }

    #[test]
    fn non_entry_fragments_are_rejected() {
        let mut corrector = DuplicateIdCorrector::new();
        let other = parse_entries(
            "fixture.xml",
            r#"<Root><LearningStandardItem RefID="A"><Statements/></LearningStandardItem></Root>"#,
        )
        .unwrap();
        let statements = other[0].select("Statements")[0].clone();
        let owner = Owner {
            node: NodeId(0),
            document: DocumentId(0),
        };
        let err = Node::new(owner, Kind::Domain, statements, &mut corrector).unwrap_err();
        assert!(matches!(err, TaxonomyError::NotAnEntry));
    }
}
