use crate::{Correct, CorrectionHandling, Document, ElementKind, KwArgs, NodeId, TextPolicy};

fn foo_sentence() -> (Document, NodeId, NodeId) {
    let mut doc = Document::new("doc").unwrap();
    let body = doc.add_body(ElementKind::Text, KwArgs::new().id("doc.text")).unwrap();
    let s = doc.add(body, ElementKind::Sentence, KwArgs::new().id("doc.s.1")).unwrap();
    doc.add(s, ElementKind::Word, KwArgs::new().id("doc.s.1.w.1").text("the"))
        .unwrap();
    let foo = doc
        .add(s, ElementKind::Word, KwArgs::new().id("doc.s.1.w.2").text("foo"))
        .unwrap();
    (doc, s, foo)
}

#[test]
fn replacing_a_word() {
    let (mut doc, s, foo) = foo_sentence();
    let bar = doc
        .create(ElementKind::Word, KwArgs::new().id("doc.s.1.w.3").text("bar"))
        .unwrap();
    let correction = doc
        .correct(s, Correct::default().original(foo).replacement(bar))
        .unwrap();

    let original = doc.get_original(correction, 0).unwrap();
    let new = doc.get_new(correction, 0).unwrap();
    assert_eq!(doc.text_of(original).unwrap(), "foo");
    assert_eq!(doc.text_of(new).unwrap(), "bar");
    doc.check_type_consistency(correction).unwrap();

    assert_eq!(doc[correction].id(), Some("doc.s.1.correction.1"));
    assert_eq!(doc.position(correction), Some(1));
    assert_eq!(doc.text_of(s).unwrap(), "the bar");
    let originals = TextPolicy::default().correction(CorrectionHandling::Original);
    assert_eq!(doc.text(s, &originals).unwrap(), "the foo");

    insta::assert_snapshot!(doc.display(s), @r###"
    s#doc.s.1                           the bar
    ├─ w#doc.s.1.w.1                    the
    └─ correction#doc.s.1.correction.1  bar
       ├─ original                      foo
       │  └─ w#doc.s.1.w.2              foo
       └─ new                           bar
          └─ w#doc.s.1.w.3              bar
    "###);
}

#[test]
fn corrections_survive_serialization() {
    let (mut doc, s, foo) = foo_sentence();
    let bar = doc.create(ElementKind::Word, KwArgs::new().text("bar")).unwrap();
    doc.correct(s, Correct::default().original(foo).replacement(bar))
        .unwrap();

    let xml = doc.to_xml_string().unwrap();
    let reread = Document::from_xml_str(&xml).unwrap();
    let s = reread.index("doc.s.1").unwrap();
    let correction = reread.index("doc.s.1.correction.1").unwrap();
    assert_eq!(reread[correction].parent(), Some(s));
    assert_eq!(reread.text_of(s).unwrap(), "the bar");
    let original = reread.get_original(correction, 0).unwrap();
    assert_eq!(reread[original].id(), Some("doc.s.1.w.2"));
    // words inside the original are not part of the current text
    assert_eq!(reread.words(s).len(), 2);
    reread.check_type_consistency(correction).unwrap();
}
