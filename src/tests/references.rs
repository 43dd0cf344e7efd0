use crate::{AnnotationType, Document, ElementKind, FoliaError, Selector};

// the entity refers forward to a word parsed after it
const INPUT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<FoLiA xmlns="http://ilk.uvt.nl/folia" xml:id="doc" version="2.5.1">
  <metadata type="native">
    <annotations>
      <text-annotation/>
      <sentence-annotation/>
      <token-annotation/>
      <entity-annotation set="ner"/>
    </annotations>
  </metadata>
  <text xml:id="doc.text">
    <s xml:id="doc.s.1">
      <entities>
        <entity class="loc"><wref id="doc.s.1.w.2" t="Utrecht"/></entity>
      </entities>
      <w xml:id="doc.s.1.w.1"><t>in</t></w>
      <w xml:id="doc.s.1.w.2"><t>Utrecht</t></w>
    </s>
  </text>
</FoLiA>"#;

#[test]
fn forward_references_resolve() {
    let doc = Document::from_xml_str(INPUT).unwrap();
    let s = doc.index("doc.s.1").unwrap();
    let w2 = doc.index("doc.s.1.w.2").unwrap();
    let entity = doc.select(s, &Selector::kind(ElementKind::Entity))[0];

    assert_eq!(doc[w2].parent(), Some(s));
    assert_eq!(doc[w2].refcount(), 1);
    assert_eq!(doc.select(entity, &Selector::kind(ElementKind::Word).local()), vec![w2]);
    assert_eq!(doc.text_of(s).unwrap(), "in Utrecht");
    assert_eq!(doc.words(s).len(), 2);

    insta::assert_snapshot!(doc.display(s).with(ElementKind::Entity), @r###"
    s#doc.s.1             in Utrecht
    ├─ entities
    │  └─ entity[loc] ─> [A]
    ├─ w#doc.s.1.w.1      in
    └─ w#doc.s.1.w.2 [A]  Utrecht
    "###);
}

#[test]
fn unknown_references_are_xml_errors() {
    let input = INPUT.replace(r#"<wref id="doc.s.1.w.2""#, r#"<wref id="doc.s.1.w.9""#);
    let err = Document::from_xml_str(&input).unwrap_err();
    assert!(matches!(err, FoliaError::Xml { line: Some(14), .. }), "{}", err);
}

#[test]
fn referenced_words_are_freed_once() {
    let mut doc = Document::from_xml_str(INPUT).unwrap();
    let s = doc.index("doc.s.1").unwrap();
    let w2 = doc.index("doc.s.1.w.2").unwrap();
    let layer = doc.select(s, &Selector::kind(ElementKind::EntitiesLayer))[0];
    let before = doc.stats();

    doc.destroy(w2).unwrap();
    assert!(doc.is_live(w2));
    assert_eq!(doc.pending_deletions().collect::<Vec<_>>(), vec![w2]);
    assert_eq!(doc.stats().freed, before.freed);
    assert_eq!(doc.words(s).len(), 1);

    doc.destroy(layer).unwrap();
    // layer, entity, the word, its t and the text leaf
    assert_eq!(doc.stats().freed, before.freed + 5);
    assert_eq!(doc.stats().live, before.live - 5);
    assert_eq!(doc.stats().pending, 0);
    assert!(!doc.is_live(w2));

    // nothing uses the entity set any more
    doc.undeclare(AnnotationType::Entity, Some("ner")).unwrap();
}
