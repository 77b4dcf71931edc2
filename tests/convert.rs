use std::io::{self, Read};

use pretty_assertions::assert_eq;

use flatmail::{
    message::{
        header::{HeaderName, HeaderValue},
        MultiPartKind, Part,
    },
    AlternateView, Attachment, Charset, LinkedResource, MailAddress, MailMessage, MailPriority,
    TransferEncoding,
};

fn single(part: &Part) -> &flatmail::message::SinglePart {
    match part {
        Part::Single(single) => single,
        Part::Multi(_) => panic!("expected a single part"),
    }
}

fn multi(part: &Part) -> &flatmail::message::MultiPart {
    match part {
        Part::Multi(multi) => multi,
        Part::Single(_) => panic!("expected a multipart"),
    }
}

#[test]
fn empty_recipient_lists_preserve_existing_headers() {
    let mut mail = MailMessage::new();
    mail.headers.append_raw(HeaderValue::new(
        HeaderName::new_from_ascii_str("To"),
        "kept@example.com".into(),
    ));
    mail.headers.append_raw(HeaderValue::new(
        HeaderName::new_from_ascii_str("Cc"),
        "also-kept@example.com".into(),
    ));

    let mime = mail.into_mime().unwrap();
    assert_eq!(mime.headers().get_raw("To"), Some("kept@example.com"));
    assert_eq!(mime.headers().get_raw("Cc"), Some("also-kept@example.com"));
}

#[test]
fn recipient_lists_replace_existing_headers_in_order() {
    let mut mail = MailMessage::new();
    mail.headers.append_raw(HeaderValue::new(
        HeaderName::new_from_ascii_str("To"),
        "stale@example.com".into(),
    ));
    mail.to.push(MailAddress::named("B", "b@example.com"));
    mail.to.push(MailAddress::new("a@example.com"));
    mail.cc.push(MailAddress::new("c@example.com"));

    let mime = mail.into_mime().unwrap();
    assert_eq!(mime.headers().get_all_raw("To").count(), 1);
    assert_eq!(
        mime.headers().get_raw("To"),
        Some("B <b@example.com>, a@example.com")
    );
    assert_eq!(mime.headers().get_raw("Cc"), Some("c@example.com"));
}

#[test]
fn sender_is_set_directly() {
    let mut mail = MailMessage::new();
    mail.sender = Some(MailAddress::named("Postmaster", "postmaster@example.com"));

    let mime = mail.into_mime().unwrap();
    assert_eq!(
        mime.headers().get_raw("Sender"),
        Some("Postmaster <postmaster@example.com>")
    );
}

#[test]
fn invalid_recipient_fails_the_whole_transform() {
    let mut mail = MailMessage::new();
    mail.to.push(MailAddress::new("not an address"));

    assert!(mail.into_mime().is_err());
}

#[test]
fn subject_defaults_to_empty() {
    let mime = MailMessage::new().into_mime().unwrap();
    assert_eq!(mime.headers().get_raw("Subject"), Some(""));
}

#[test]
fn high_priority_markers() {
    let mut mail = MailMessage::new();
    mail.priority = MailPriority::High;

    let mime = mail.into_mime().unwrap();
    assert_eq!(mime.headers().get_raw("Priority"), Some("urgent"));
    assert_eq!(mime.headers().get_raw("Importance"), Some("high"));
    assert_eq!(mime.headers().get_raw("X-Priority"), Some("2 (High)"));
    assert_eq!(mime.headers().get_raw("X-MSMail-Priority"), None);
}

#[test]
fn normal_priority_clears_stale_markers() {
    let mut mail = MailMessage::new();
    for (name, value) in [
        ("X-MSMail-Priority", "High"),
        ("Importance", "high"),
        ("X-Priority", "2 (High)"),
        ("Priority", "urgent"),
    ] {
        mail.headers.append_raw(HeaderValue::new(
            HeaderName::new_from_ascii(name.to_owned()),
            value.into(),
        ));
    }

    let mime = mail.into_mime().unwrap();
    for name in ["X-MSMail-Priority", "Importance", "X-Priority", "Priority"] {
        assert_eq!(mime.headers().get_raw(name), None, "{name} should be gone");
    }
}

#[test]
fn body_only_yields_a_single_leaf() {
    let mut mail = MailMessage::new();
    mail.body = Some("hello".to_owned());

    let mime = mail.into_mime().unwrap();
    let leaf = mime.body_singlepart().expect("body is a single leaf");
    assert_eq!(
        leaf.headers().get_raw("Content-Type"),
        Some("text/plain; charset=utf-8")
    );
    assert_eq!(leaf.raw_body(), b"hello");
}

#[test]
fn non_utf8_body_charset_is_rejected() {
    let mut mail = MailMessage::new();
    mail.body = Some("Привет".to_owned());
    mail.body_encoding = Some(Charset::new("koi8-r"));

    let err = mail.into_mime().unwrap_err();
    assert!(matches!(err, flatmail::Error::Charset(_)));
}

#[test]
fn utf8_charset_spellings_are_normalized() {
    let mut mail = MailMessage::new();
    mail.body = Some("hello".to_owned());
    mail.body_encoding = Some(Charset::new("UTF8"));

    let mime = mail.into_mime().unwrap();
    let leaf = single(mime.body());
    assert_eq!(
        leaf.headers().get_raw("Content-Type"),
        Some("text/plain; charset=utf-8")
    );
    assert_eq!(leaf.raw_body(), b"hello");
}

#[test]
fn html_flag_switches_the_leaf_subtype() {
    let mut mail = MailMessage::new();
    mail.body = Some("<p>hello</p>".to_owned());
    mail.body_is_html = true;

    let mime = mail.into_mime().unwrap();
    let leaf = single(mime.body());
    assert_eq!(
        leaf.headers().get_raw("Content-Type"),
        Some("text/html; charset=utf-8")
    );
}

#[test]
fn body_and_view_yield_an_alternative_pair() {
    let mut mail = MailMessage::new();
    mail.body = Some("plain rendition".to_owned());
    mail.alternate_views.push(AlternateView::from_bytes(
        b"<p>rich rendition</p>".to_vec(),
        "text/html; charset=utf-8",
    ));

    let mime = mail.into_mime().unwrap();
    let alternative = multi(mime.body());
    assert_eq!(alternative.kind(), Some(MultiPartKind::Alternative));
    assert_eq!(alternative.parts().len(), 2);

    assert_eq!(single(&alternative.parts()[0]).raw_body(), b"plain rendition");
    assert_eq!(
        single(&alternative.parts()[1]).raw_body(),
        b"<p>rich rendition</p>"
    );
}

#[test]
fn lone_view_is_still_wrapped_in_alternative() {
    let mut mail = MailMessage::new();
    mail.alternate_views.push(AlternateView::from_bytes(
        b"<p>only rendition</p>".to_vec(),
        "text/html; charset=utf-8",
    ));

    let mime = mail.into_mime().unwrap();
    let alternative = multi(mime.body());
    assert_eq!(alternative.kind(), Some(MultiPartKind::Alternative));
    assert_eq!(alternative.parts().len(), 1);
}

#[test]
fn view_with_resources_becomes_related() {
    let view = AlternateView::from_bytes(
        b"<img src=\"cid:one\"><img src=\"cid:two\">".to_vec(),
        "text/html; charset=utf-8",
    )
    .linked_resource(
        LinkedResource::from_bytes(b"PNG1".to_vec(), "image/png").content_id("one"),
    )
    .linked_resource(
        LinkedResource::from_bytes(b"PNG2".to_vec(), "image/png")
            .content_id("two")
            .content_location("http://example.com/two.png"),
    );

    let mut mail = MailMessage::new();
    mail.body = Some("plain rendition".to_owned());
    mail.alternate_views.push(view);

    let mime = mail.into_mime().unwrap();
    let alternative = multi(mime.body());
    assert_eq!(alternative.parts().len(), 2);

    let related = multi(&alternative.parts()[1]);
    assert_eq!(
        related.kind(),
        Some(MultiPartKind::Related {
            root_type: Some("text/html".to_owned())
        })
    );
    assert_eq!(related.parts().len(), 3);

    let root = single(&related.parts()[0]);
    assert_eq!(root.raw_body(), b"<img src=\"cid:one\"><img src=\"cid:two\">");

    let first = single(&related.parts()[1]);
    assert_eq!(first.headers().get_raw("Content-ID"), Some("<one>"));
    assert_eq!(first.raw_body(), b"PNG1");

    let second = single(&related.parts()[2]);
    assert_eq!(second.headers().get_raw("Content-ID"), Some("<two>"));
    assert_eq!(
        second.headers().get_raw("Content-Location"),
        Some("http://example.com/two.png")
    );
    assert_eq!(second.raw_body(), b"PNG2");
}

#[test]
fn base_location_tags_the_view_leaf() {
    let mut mail = MailMessage::new();
    mail.alternate_views.push(
        AlternateView::from_bytes(b"<p>hi</p>".to_vec(), "text/html; charset=utf-8")
            .base_location("http://example.com/"),
    );

    let mime = mail.into_mime().unwrap();
    let alternative = multi(mime.body());
    let leaf = single(&alternative.parts()[0]);
    assert_eq!(
        leaf.headers().get_raw("Content-Location"),
        Some("http://example.com/")
    );
}

#[test]
fn attachment_without_body_gets_an_empty_text_leaf() {
    let mut mail = MailMessage::new();
    mail.attachments
        .push(Attachment::from_bytes(b"%PDF-1.4".to_vec(), "application/pdf"));

    let mime = mail.into_mime().unwrap();
    let mixed = mime.body_multipart().expect("body is a multipart");
    assert_eq!(mixed.kind(), Some(MultiPartKind::Mixed));
    assert_eq!(mixed.parts().len(), 2);

    let placeholder = single(&mixed.parts()[0]);
    assert_eq!(
        placeholder.headers().get_raw("Content-Type"),
        Some("text/plain; charset=utf-8")
    );
    assert_eq!(placeholder.raw_body(), b"");

    let attachment = single(&mixed.parts()[1]);
    assert_eq!(
        attachment.headers().get_raw("Content-Disposition"),
        Some("attachment")
    );
    assert_eq!(attachment.raw_body(), b"%PDF-1.4");
}

#[test]
fn attachment_payload_is_byte_identical() {
    let payload: Vec<u8> = (0u8..=255).collect();

    let mut mail = MailMessage::new();
    mail.body = Some("see attachment".to_owned());
    mail.attachments.push(
        Attachment::from_bytes(payload.clone(), "application/octet-stream")
            .disposition("attachment; filename=\"blob.bin\""),
    );

    let mime = mail.into_mime().unwrap();
    let mixed = multi(mime.body());
    assert_eq!(single(&mixed.parts()[1]).raw_body(), payload.as_slice());
}

#[test]
fn encoding_hints_map_onto_the_leaf() {
    let mut mail = MailMessage::new();
    mail.attachments.push(
        Attachment::from_bytes(b"data".to_vec(), "application/octet-stream")
            .transfer_encoding(TransferEncoding::Base64),
    );
    mail.attachments.push(
        Attachment::from_bytes(b"data".to_vec(), "application/octet-stream")
            .transfer_encoding(TransferEncoding::EightBit),
    );
    mail.attachments.push(
        Attachment::from_bytes(b"data".to_vec(), "application/octet-stream")
            .transfer_encoding(TransferEncoding::Unknown),
    );

    let mime = mail.into_mime().unwrap();
    let mixed = multi(mime.body());

    assert_eq!(
        single(&mixed.parts()[1])
            .headers()
            .get_raw("Content-Transfer-Encoding"),
        Some("base64")
    );
    // unmapped hints leave the choice to serialization
    for part in &mixed.parts()[2..] {
        assert_eq!(
            single(part).headers().get_raw("Content-Transfer-Encoding"),
            None
        );
    }
}

struct FailingStream;

impl Read for FailingStream {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "backing store went away",
        ))
    }
}

#[test]
fn stream_read_failure_aborts_the_transform() {
    let mut mail = MailMessage::new();
    mail.attachments
        .push(Attachment::new(FailingStream, "application/octet-stream"));

    let err = mail.into_mime().unwrap_err();
    assert!(matches!(err, flatmail::Error::Io(_)));
}

#[test]
fn malformed_content_type_is_a_format_error() {
    let mut mail = MailMessage::new();
    mail.attachments
        .push(Attachment::from_bytes(b"data".to_vec(), "not a type"));

    let err = mail.into_mime().unwrap_err();
    assert!(matches!(err, flatmail::Error::ContentType(_)));
}

#[test]
fn malformed_disposition_is_a_format_error() {
    let mut mail = MailMessage::new();
    mail.attachments.push(
        Attachment::from_bytes(b"data".to_vec(), "application/pdf").disposition("not a token"),
    );

    let err = mail.into_mime().unwrap_err();
    assert!(matches!(err, flatmail::Error::ContentDisposition(_)));
}

#[test]
fn mime_version_is_always_present() {
    let mime = MailMessage::new().into_mime().unwrap();
    assert_eq!(mime.headers().get_raw("MIME-Version"), Some("1.0"));
}

#[test]
fn formatted_singlepart_message() {
    let mut mail = MailMessage::new();
    mail.from
        .push(MailAddress::named("NoBody", "nobody@domain.tld"));
    mail.to.push(MailAddress::new("hei@domain.tld"));
    mail.subject = Some("Happy new year".to_owned());
    mail.body = Some("Be happy!".to_owned());

    let mime = mail.into_mime().unwrap();

    assert_eq!(
        String::from_utf8(mime.formatted()).unwrap(),
        concat!(
            "From: NoBody <nobody@domain.tld>\r\n",
            "To: hei@domain.tld\r\n",
            "Subject: Happy new year\r\n",
            "MIME-Version: 1.0\r\n",
            "Content-Type: text/plain; charset=utf-8\r\n",
            "Content-Transfer-Encoding: 7bit\r\n",
            "\r\n",
            "Be happy!\r\n"
        )
    );
}
