use crate::{
    AnnotationType, DeclareArgs, Document, DocumentConfig, DocumentMode, ElementKind, FoliaError, KwArgs, NodeId,
    Version,
};

fn declared_document(mode: DocumentMode) -> Document {
    let mut doc = Document::with_mode("example", Version::current(), mode).unwrap();
    doc.declare(AnnotationType::Text, None, DeclareArgs::new()).unwrap();
    doc.declare(AnnotationType::Sentence, None, DeclareArgs::new()).unwrap();
    doc.declare(
        AnnotationType::Token,
        Some("tokconfig-nld"),
        DeclareArgs::new().annotator("ucto"),
    )
    .unwrap();
    doc
}

fn sentence(doc: &mut Document, words: &[&str]) -> NodeId {
    let body = doc
        .add_body(ElementKind::Text, KwArgs::new().id("example.text"))
        .unwrap();
    let s = doc
        .add(body, ElementKind::Sentence, KwArgs::new().id("example.s.1"))
        .unwrap();
    for word in words {
        doc.add(s, ElementKind::Word, KwArgs::new().generate_id("example.s.1").text(*word))
            .unwrap();
    }
    s
}

#[test]
fn sentence_text_from_words() {
    let mut doc = declared_document(DocumentMode::CHECK_TEXT);
    let s = sentence(&mut doc, &["De", "site", "staat", "online", "."]);

    assert_eq!(doc.text_of(s).unwrap(), "De site staat online .");
    assert_eq!(doc[s].children().len(), 5);

    let words = doc.words(s);
    assert_eq!(doc[words[0]].id(), Some("example.s.1.w.1"));
    assert_eq!(doc[words[0]].set(), Some("tokconfig-nld"));
    assert_eq!(doc[words[0]].annotator(), Some("ucto"));
    assert_eq!(doc.index("example.s.1.w.5"), Some(words[4]));
}

#[test]
fn undeclare_waits_for_the_last_user() {
    let mut doc = declared_document(DocumentMode::CHECK_TEXT);
    let s = sentence(&mut doc, &["Jan"]);
    let w = doc.words(s)[0];

    doc.declare(AnnotationType::Pos, Some("tags"), DeclareArgs::new()).unwrap();
    let pos = doc
        .add(w, ElementKind::PosAnnotation, KwArgs::new().class("SPEC"))
        .unwrap();
    let err = doc.undeclare(AnnotationType::Pos, Some("tags")).unwrap_err();
    assert!(matches!(err, FoliaError::Declaration(_)));
    assert!(doc.declared(AnnotationType::Pos, Some("tags")));

    doc.destroy(pos).unwrap();
    doc.undeclare(AnnotationType::Pos, Some("tags")).unwrap();
    assert!(!doc.declared(AnnotationType::Pos, None));

    // now undeclared, so a new pos fails outright
    let err = doc
        .add(w, ElementKind::PosAnnotation, KwArgs::new().class("SPEC").set("tags"))
        .unwrap_err();
    assert!(matches!(err, FoliaError::Declaration(_)));
}

#[test]
fn declaring_twice_is_idempotent() {
    let mut doc = declared_document(DocumentMode::empty());
    let before = doc.declarations().len();
    doc.declare(
        AnnotationType::Token,
        Some("tokconfig-nld"),
        DeclareArgs::new().annotator("ucto"),
    )
    .unwrap();
    assert_eq!(doc.declarations().len(), before);
    assert_eq!(
        doc.declarations()
            .default_annotator(AnnotationType::Token, Some("tokconfig-nld")),
        Some("ucto")
    );
}

#[test]
fn serialized_layout() {
    let mut doc = Document::with_mode(
        "example",
        Version::current(),
        DocumentMode::STRIP | DocumentMode::AUTODECLARE,
    )
    .unwrap();
    let s = {
        let body = doc
            .add_body(ElementKind::Text, KwArgs::new().id("example.text"))
            .unwrap();
        doc.add(body, ElementKind::Sentence, KwArgs::new().id("example.s.1"))
            .unwrap()
    };
    let hello = doc
        .add(s, ElementKind::Word, KwArgs::new().id("example.s.1.w.1").text("Hello"))
        .unwrap();
    doc.add(s, ElementKind::Word, KwArgs::new().id("example.s.1.w.2").text("world"))
        .unwrap();
    doc.add(hello, ElementKind::PosAnnotation, KwArgs::new().class("INTJ").set("tags"))
        .unwrap();

    insta::assert_snapshot!(doc.to_xml_string().unwrap(), @r###"
    <?xml version="1.0" encoding="utf-8"?>
    <FoLiA xmlns="http://ilk.uvt.nl/folia" xmlns:xlink="http://www.w3.org/1999/xlink" xml:id="example" version="2.5.1">
      <metadata type="native">
        <annotations>
          <sentence-annotation/>
          <token-annotation/>
          <text-annotation/>
          <pos-annotation set="tags"/>
        </annotations>
      </metadata>
      <text xml:id="example.text">
        <s xml:id="example.s.1">
          <w xml:id="example.s.1.w.1">
            <t>Hello</t>
            <pos class="INTJ"/>
          </w>
          <w xml:id="example.s.1.w.2">
            <t>world</t>
          </w>
        </s>
      </text>
    </FoLiA>
    "###);
}

#[test]
fn configured_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("folia.toml");
    std::fs::write(&config_path, "strip = true\ncheck_text = true\n").unwrap();
    let config = DocumentConfig::load(&config_path).unwrap();

    let mut doc = declared_document(config.mode_for(&Version::current()));
    let s = sentence(&mut doc, &["Het", "regent"]);
    doc.metadata_mut().set("language", "nld");
    doc.set_text(s, "Het regent", "current").unwrap();

    let path = dir.path().join("example.folia.xml");
    doc.save(&path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(!written.contains("generator="));

    let loaded = Document::from_file(&path, &config).unwrap();
    assert!(loaded.has_mode(DocumentMode::STRIP | DocumentMode::CHECK_TEXT));
    assert!(!loaded.has_mode(DocumentMode::AUTODECLARE));
    assert_eq!(loaded.metadata().get("language"), Some("nld"));
    let s = loaded.index("example.s.1").unwrap();
    assert_eq!(loaded.text_of(s).unwrap(), "Het regent");
    assert_eq!(loaded.text_classes(s), vec!["current".to_string()]);
    assert_eq!(
        loaded.declarations().default_annotator(AnnotationType::Token, Some("tokconfig-nld")),
        Some("ucto")
    );
}

#[test]
fn offsets_are_checked_after_parsing() {
    let input = |offset: usize| {
        format!(
            r#"<FoLiA xmlns="http://ilk.uvt.nl/folia" xml:id="doc" version="2.5.1">
  <metadata type="native">
    <annotations><text-annotation/><sentence-annotation/><token-annotation/></annotations>
  </metadata>
  <text xml:id="doc.text">
    <s xml:id="doc.s.1">
      <t>abcdef</t>
      <w xml:id="doc.s.1.w.1"><t offset="{}">cde</t></w>
    </s>
  </text>
</FoLiA>"#,
            offset
        )
    };
    let config = DocumentConfig {
        check_text: Some(false),
        ..DocumentConfig::default()
    };
    let doc = Document::from_xml_str_with(&input(3), &config).unwrap();
    assert_eq!(doc.warnings(), 0);

    let err = Document::from_xml_str_with(&input(4), &config).unwrap_err();
    assert!(matches!(err, FoliaError::UnresolvableTextContent(_)), "{}", err);
}
