//! The flat-to-MIME transform.
//!
//! Conversion runs in three stages: top-level fields are projected onto
//! the header collection, the body tree is assembled bottom-up from body
//! text, alternate views and attachments, and every content item is
//! materialized into exactly one leaf part along the way. The transform
//! either yields a complete tree or fails as a whole; there is no partial
//! output.

use std::io::Read;

use tracing::debug;

use crate::{
    error::Error,
    flat::{
        AlternateView, Attachment, Charset, LinkedResource, MailAddress, MailMessage,
        MailPriority, TransferEncoding,
    },
    message::{
        header::{self, Header, Headers},
        Mailboxes, MimeMessage, MultiPart, Part, SinglePart,
    },
};

impl MailMessage {
    /// Converts the flat message into a structured MIME message.
    ///
    /// The message is consumed: content streams are read to the end
    /// exactly once and their bytes move into the output tree. Every
    /// stream is buffered in memory in full, so streams must be bounded.
    pub fn into_mime(self) -> Result<MimeMessage, Error> {
        let MailMessage {
            mut headers,
            sender,
            from,
            reply_to,
            to,
            cc,
            bcc,
            subject,
            subject_encoding,
            priority,
            body,
            body_is_html,
            body_encoding,
            alternate_views,
            attachments,
        } = self;

        if let Some(sender) = &sender {
            headers.set(header::Sender(sender.to_mailbox()?));
        }
        replace_mailboxes::<header::From>(&mut headers, &from)?;
        replace_mailboxes::<header::ReplyTo>(&mut headers, &reply_to)?;
        replace_mailboxes::<header::To>(&mut headers, &to)?;
        replace_mailboxes::<header::Cc>(&mut headers, &cc)?;
        replace_mailboxes::<header::Bcc>(&mut headers, &bcc)?;

        let subject = subject.unwrap_or_default();
        if subject_encoding.is_some() {
            headers.remove_all::<header::Subject>();
            headers.append(header::Subject::new(subject));
        } else {
            headers.set(header::Subject::new(subject));
        }

        project_priority(&mut headers, priority);
        debug!(?priority, "projected headers");

        // The body text is a `String` and is never transcoded, so only a
        // utf-8 label can match the payload. Alias spellings are
        // normalized, anything else aborts the conversion.
        let charset = match body_encoding {
            None => Charset::UTF_8,
            Some(charset) if charset.is_utf8() => Charset::UTF_8,
            Some(charset) => return Err(Error::Charset(charset)),
        };
        let subtype = if body_is_html { "html" } else { "plain" };

        debug!(
            views = alternate_views.len(),
            attachments = attachments.len(),
            "building body tree"
        );

        let mut body_part = match body.filter(|text| !text.is_empty()) {
            Some(text) => Some(Part::Single(text_leaf(subtype, &charset, text)?)),
            None => None,
        };

        if !alternate_views.is_empty() {
            let mut alternative = MultiPart::alternative().build();
            if let Some(text) = body_part.take() {
                alternative = alternative.part(text);
            }
            for view in alternate_views {
                alternative = alternative.part(view_entry(view)?);
            }
            body_part = Some(Part::Multi(alternative));
        }

        // A message never goes out without a body node.
        let mut body_part = match body_part {
            Some(part) => part,
            None => Part::Single(text_leaf(subtype, &charset, String::new())?),
        };

        if !attachments.is_empty() {
            let mut mixed = MultiPart::mixed().build().part(body_part);
            for attachment in attachments {
                mixed = mixed.singlepart(materialize(attachment.into())?);
            }
            body_part = Part::Multi(mixed);
        }

        headers.set(header::MIME_VERSION_1_0);

        Ok(MimeMessage::new(headers, body_part))
    }
}

impl TryFrom<MailMessage> for MimeMessage {
    type Error = Error;

    fn try_from(mail: MailMessage) -> Result<Self, Self::Error> {
        mail.into_mime()
    }
}

/// Erases then re-appends the mailbox header for `H` when the input list
/// is non-empty. An empty list leaves pre-existing entries untouched.
fn replace_mailboxes<H>(headers: &mut Headers, addresses: &[MailAddress]) -> Result<(), Error>
where
    H: Header + From<Mailboxes>,
{
    if addresses.is_empty() {
        return Ok(());
    }

    let mailboxes = addresses
        .iter()
        .map(MailAddress::to_mailbox)
        .collect::<Result<Mailboxes, _>>()?;

    headers.remove_all::<H>();
    headers.append(H::from(mailboxes));
    Ok(())
}

fn project_priority(headers: &mut Headers, priority: MailPriority) {
    match priority {
        MailPriority::Normal => {
            headers.remove_all::<header::XMSMailPriority>();
            headers.remove_all::<header::Importance>();
            headers.remove_all::<header::XPriority>();
            headers.remove_all::<header::Priority>();
        }
        MailPriority::High => {
            headers.set(header::Priority::new("urgent"));
            headers.set(header::Importance::new("high"));
            headers.set(header::XPriority::new("2 (High)"));
        }
        MailPriority::Low => {
            headers.set(header::Priority::new("non-urgent"));
            headers.set(header::Importance::new("low"));
            headers.set(header::XPriority::new("4 (Low)"));
        }
    }
}

fn text_leaf(subtype: &str, charset: &Charset, text: String) -> Result<SinglePart, Error> {
    let content_type = header::ContentType::parse(&format!("text/{subtype}; charset={charset}"))?;
    Ok(SinglePart::builder().header(content_type).body(text))
}

/// Lowers an alternate view into its entry in the `alternative` composite:
/// the bare leaf, or a `related` composite when the view carries inline
/// resources.
fn view_entry(view: AlternateView) -> Result<Part, Error> {
    let AlternateView {
        content,
        content_type,
        content_id,
        transfer_encoding,
        base_location,
        linked_resources,
    } = view;

    // The advertised root type of a related composite is the view's own
    // media type.
    let root_type = if linked_resources.is_empty() {
        None
    } else {
        Some(
            header::ContentType::parse(&content_type)?
                .essence()
                .to_owned(),
        )
    };

    let mut leaf = materialize(ContentItem {
        content,
        content_type,
        content_id,
        transfer_encoding,
        disposition: None,
    })?;

    if let Some(location) = &base_location {
        leaf.headers_mut()
            .set(header::ContentLocation::new(location.clone()));
    }

    let root_type = match root_type {
        Some(root_type) => root_type,
        None => return Ok(Part::Single(leaf)),
    };

    let mut builder = MultiPart::related_to(root_type);
    if let Some(location) = base_location {
        builder = builder.header(header::ContentLocation::new(location));
    }

    let mut related = builder.singlepart(leaf);
    for resource in linked_resources {
        related = related.singlepart(resource_entry(resource)?);
    }

    Ok(Part::Multi(related))
}

fn resource_entry(resource: LinkedResource) -> Result<SinglePart, Error> {
    let content_location = resource.content_location.clone();

    let mut leaf = materialize(resource.into())?;
    if let Some(location) = content_location {
        leaf.headers_mut()
            .set(header::ContentLocation::new(location));
    }

    Ok(leaf)
}

/// One content item on its way to becoming a leaf part. Views, linked
/// resources and attachments all funnel through this shape; only
/// attachments carry a disposition.
pub(crate) struct ContentItem {
    content: Box<dyn Read>,
    content_type: String,
    content_id: Option<String>,
    transfer_encoding: TransferEncoding,
    disposition: Option<String>,
}

impl From<Attachment> for ContentItem {
    fn from(attachment: Attachment) -> Self {
        ContentItem {
            content: attachment.content,
            content_type: attachment.content_type,
            content_id: attachment.content_id,
            transfer_encoding: attachment.transfer_encoding,
            disposition: Some(attachment.disposition),
        }
    }
}

impl From<LinkedResource> for ContentItem {
    fn from(resource: LinkedResource) -> Self {
        ContentItem {
            content: resource.content,
            content_type: resource.content_type,
            content_id: resource.content_id,
            transfer_encoding: resource.transfer_encoding,
            disposition: None,
        }
    }
}

/// Materializes one content item into a single leaf part.
///
/// The content stream is drained into an in-memory buffer which becomes
/// the leaf's payload, byte for byte.
fn materialize(item: ContentItem) -> Result<SinglePart, Error> {
    let ContentItem {
        mut content,
        content_type,
        content_id,
        transfer_encoding,
        disposition,
    } = item;

    let mut builder = SinglePart::builder().header(header::ContentType::parse(&content_type)?);

    if let Some(disposition) = disposition {
        builder = builder.header(header::ContentDisposition::parse(&disposition)?);
    }

    if let Some(encoding) = transfer_encoding.to_content_encoding() {
        builder = builder.header(encoding);
    }

    if let Some(content_id) = content_id {
        builder = builder.header(header::ContentId::new(angle_wrapped(content_id)));
    }

    let mut buffer = Vec::new();
    content.read_to_end(&mut buffer)?;

    Ok(builder.body(buffer))
}

fn angle_wrapped(id: String) -> String {
    if id.starts_with('<') {
        id
    } else {
        format!("<{id}>")
    }
}
