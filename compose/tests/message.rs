use std::fs;

use base64::{engine::general_purpose::STANDARD, Engine};
use compose::{AttachmentSpec, AttachmentsConfig, BodyFormat, Error, MessageBuilder, SendRequest};
use concat_with::concat_line;
use mail_parser::{Message, MessageParser, MessagePart, MimeHeaders};
use tempfile::tempdir;

fn parse(raw: &[u8]) -> Message<'_> {
    MessageParser::default().parse(raw).unwrap()
}

/// Check that the given part is declared and written as base64, then
/// decode its raw body.
fn decode_raw_body(raw: &[u8], part: &MessagePart) -> Vec<u8> {
    assert_eq!(part.content_transfer_encoding(), Some("base64"));

    let body = std::str::from_utf8(&raw[part.raw_body_offset()..part.raw_end_offset()]).unwrap();
    let lines: Vec<_> = body.split_whitespace().collect();
    assert!(lines.iter().all(|line| line.len() <= 76), "{body}");

    STANDARD.decode(lines.concat()).unwrap()
}

#[test_log::test]
fn html_body_without_attachments() {
    let request = SendRequest::new("a@example.com", "Hi", "<b>hello</b>")
        .with_body_format(BodyFormat::Html);

    let encoded = MessageBuilder::default().build(&request).unwrap();
    let raw = encoded.decode().unwrap();
    let msg = parse(&raw);

    assert_eq!(msg.subject(), Some("Hi"));
    assert_eq!(
        msg.to().and_then(|to| to.first()).and_then(|to| to.address()),
        Some("a@example.com"),
    );

    // the multipart container plus its single body part
    assert_eq!(msg.parts.len(), 2);
    assert_eq!(msg.attachment_count(), 0);
    assert_eq!(msg.html_body_count(), 1);

    let ctype = msg.parts[1].content_type().unwrap();
    assert_eq!(ctype.ctype(), "text");
    assert_eq!(ctype.subtype(), Some("html"));
    assert_eq!(msg.body_html(0).unwrap().trim(), "<b>hello</b>");
}

#[test_log::test]
fn plain_body_is_utf8() {
    let request = SendRequest::new("a@example.com", "Grüße", "Ça va? Привет");

    let raw = MessageBuilder::default().build_mime(&request).unwrap();
    let msg = parse(&raw);

    assert_eq!(msg.subject(), Some("Grüße"));
    assert_eq!(msg.body_text(0).unwrap().trim(), "Ça va? Привет");

    let ctype = msg.parts[1].content_type().unwrap();
    assert_eq!(ctype.subtype(), Some("plain"));
    assert_eq!(ctype.attribute("charset"), Some("utf-8"));
}

#[test_log::test]
fn recipient_is_written_verbatim() {
    let request = SendRequest::new("Alice <alice@example.com>", "Hi", "hello");

    let raw = MessageBuilder::default().build_mime(&request).unwrap();
    let msg = parse(&raw);
    let to = msg.to().and_then(|to| to.first()).unwrap();

    assert_eq!(to.name(), Some("Alice"));
    assert_eq!(to.address(), Some("alice@example.com"));
}

#[test_log::test]
fn header_injection() {
    let request = SendRequest::new("a@example.com\r\nBcc: eve@example.com", "Hi", "hello");

    let err = MessageBuilder::default().build(&request).unwrap_err();
    assert!(matches!(err, Error::InvalidHeaderError("To")), "{err:?}");

    let request = SendRequest::new("a@example.com", "Hi\nthere", "hello");

    let err = MessageBuilder::default().build(&request).unwrap_err();
    assert!(matches!(err, Error::InvalidHeaderError("Subject")), "{err:?}");
}

#[test_log::test]
fn inline_attachment() {
    let request = SendRequest::new("a@example.com", "Hi", "hello")
        .with_attachment(AttachmentSpec::from_base64("a.txt", "aGVsbG8="));

    let raw = MessageBuilder::default().build_mime(&request).unwrap();
    let msg = parse(&raw);

    assert_eq!(msg.attachment_count(), 1);

    let attachment = msg.attachment(0).unwrap();
    assert_eq!(attachment.attachment_name(), Some("a.txt"));
    assert_eq!(attachment.contents(), b"hello");
    assert_eq!(decode_raw_body(&raw, attachment), b"hello");
}

#[test_log::test]
fn binary_path_attachment() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("blob.bin"), [0xffu8, 0x00, 0xfe]).unwrap();

    let config = AttachmentsConfig::new().with_base_dir(dir.path());
    let request = SendRequest::new("a@example.com", "Hi", "hello")
        .with_attachment(AttachmentSpec::from_path("blob.bin"));

    let raw = MessageBuilder::new(config).build_mime(&request).unwrap();
    let msg = parse(&raw);

    let attachment = msg.attachment(0).unwrap();
    assert_eq!(attachment.attachment_name(), Some("blob.bin"));
    assert_eq!(attachment.contents(), [0xffu8, 0x00, 0xfe]);
    assert_eq!(decode_raw_body(&raw, attachment), [0xffu8, 0x00, 0xfe]);
}

#[test_log::test]
fn wrapped_inline_attachment() {
    let content = concat_line!(
        "aGVsbG8gd29ybGQsIHRo",
        "aXMgaXMgYSB3cmFwcGVk",
        "IHBheWxvYWQ=",
    );
    let request = SendRequest::new("a@example.com", "Hi", "hello")
        .with_attachment(AttachmentSpec::from_base64("wrapped.txt", content));

    let raw = MessageBuilder::default().build_mime(&request).unwrap();
    let msg = parse(&raw);

    let attachment = msg.attachment(0).unwrap();
    assert_eq!(attachment.contents(), b"hello world, this is a wrapped payload");
    assert_eq!(
        decode_raw_body(&raw, attachment),
        b"hello world, this is a wrapped payload"
    );
}

#[test_log::test]
fn guessed_mime_type() {
    let request = SendRequest::new("a@example.com", "Hi", "hello")
        .with_attachment(AttachmentSpec::from_base64("report.pdf", "JVBERi0xLjQ="));

    let raw = MessageBuilder::default().build_mime(&request).unwrap();
    let msg = parse(&raw);

    let ctype = msg.attachment(0).unwrap().content_type().unwrap();
    assert_eq!(ctype.ctype(), "application");
    assert_eq!(ctype.subtype(), Some("pdf"));
}

#[test_log::test]
fn mime_type_without_subtype() {
    let request = SendRequest::new("a@example.com", "Hi", "hello").with_attachment(
        AttachmentSpec::from_base64("blob", "AAEC").with_mime_type("application"),
    );

    let raw = MessageBuilder::default().build_mime(&request).unwrap();
    let msg = parse(&raw);

    let ctype = msg.attachment(0).unwrap().content_type().unwrap();
    assert_eq!(ctype.ctype(), "application");
    assert_eq!(ctype.subtype(), Some("octet-stream"));
}

#[test_log::test]
fn attachments_keep_their_order() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("output")).unwrap();
    fs::write(dir.path().join("output/second.csv"), "a,b\n1,2\n").unwrap();

    let config = AttachmentsConfig::new().with_base_dir(dir.path());
    let request = SendRequest::new("a@example.com", "Report", "see attached").with_attachments([
        AttachmentSpec::from_base64("first.txt", "Zmlyc3Q="),
        AttachmentSpec::from_path("output/second.csv"),
        AttachmentSpec::from_base64("third.bin", "AAEC").with_mime_type("application/x-custom"),
    ]);

    let raw = MessageBuilder::new(config).build_mime(&request).unwrap();
    let msg = parse(&raw);

    let names: Vec<_> = msg
        .attachments()
        .filter_map(|part| part.attachment_name())
        .collect();
    assert_eq!(names, ["first.txt", "second.csv", "third.bin"]);

    assert_eq!(msg.attachment(0).unwrap().contents(), b"first");
    assert_eq!(msg.attachment(1).unwrap().contents(), b"a,b\n1,2\n");
    assert_eq!(msg.attachment(2).unwrap().contents(), [0u8, 1, 2]);

    for part in msg.attachments() {
        assert_eq!(decode_raw_body(&raw, part), part.contents());
    }
}

#[test_log::test]
fn failing_attachment_builds_nothing() {
    let dir = tempdir().unwrap();

    let config = AttachmentsConfig::new().with_base_dir(dir.path());
    let request = SendRequest::new("a@example.com", "Hi", "hello").with_attachments([
        AttachmentSpec::from_base64("ok.txt", "aGVsbG8="),
        AttachmentSpec::from_path("../escape.txt"),
    ]);

    let err = MessageBuilder::new(config).build(&request).unwrap_err();
    assert!(matches!(err, Error::PathEscapeError(..)), "{err:?}");
}
