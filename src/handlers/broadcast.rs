use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, InputMedia, InputMediaPhoto};
use teloxide::RequestError;

use super::send_message::BetterSendMessage as _;
use crate::collaborators::Delivery;
use crate::messages::BOT_STOPPED;
use crate::report::Report;
use crate::types::{BotType, Photo};

const TEXT_LIMIT: usize = 4096;
const CAPTION_LIMIT: usize = 1024;
const MEDIA_GROUP_LIMIT: usize = 10;
const MAX_RETRIES: usize = 3;

/// One Telegram request of a report delivery.
#[derive(Debug, PartialEq)]
enum Part<'a> {
    Text(&'a str),
    Photo(&'a Photo, Option<&'a str>),
    /// Caption goes on the first photo.
    Album(&'a [Photo], Option<&'a str>),
}

/// Splits a report into requests. The text rides along as the caption of the
/// first photo when Telegram allows it, otherwise it is sent first on its own.
fn plan(report: &Report) -> Vec<Part<'_>> {
    let mut parts = Vec::new();

    let mut caption = if !report.album.is_empty() && units(&report.text) <= CAPTION_LIMIT {
        Some(report.text.as_str())
    } else {
        parts.extend(split_text(&report.text, TEXT_LIMIT).into_iter().map(Part::Text));
        None
    };

    for chunk in report.album.chunks(MEDIA_GROUP_LIMIT) {
        let caption = caption.take();
        parts.push(match chunk {
            [photo] => Part::Photo(photo, caption),
            _ => Part::Album(chunk, caption),
        });
    }

    parts
}

/// Telegram counts message length in UTF-16 code units.
fn units(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Cuts text into messages of at most `limit` units. Cuts fall on line
/// breaks where possible and never inside a tag or an entity; report lines
/// close their own tags, so every piece stays valid HTML.
fn split_text(text: &str, limit: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while units(rest) > limit {
        let (piece, tail) = rest.split_at(cut_point(rest, limit));
        pieces.push(piece);
        rest = tail;
    }
    if !rest.is_empty() || pieces.is_empty() {
        pieces.push(rest);
    }
    pieces
}

/// Byte offset where the first piece of `text` ends.
fn cut_point(text: &str, limit: usize) -> usize {
    let mut used = 0;
    let mut end = text.len();
    for (i, c) in text.char_indices() {
        used += c.len_utf16();
        if used > limit {
            end = i.max(c.len_utf8());
            break;
        }
    }

    let head = &text[..end];
    if let Some(newline) = head.rfind('\n').filter(|&i| i > 0) {
        return newline + 1;
    }

    let open_tag = head.rfind('<').filter(|&i| !head[i..].contains('>'));
    let open_entity = head.rfind('&').filter(|&i| !head[i..].contains(';'));
    match open_tag.into_iter().chain(open_entity).min() {
        Some(i) if i > 0 => i,
        _ => end,
    }
}

/// Sends reports to every recipient, 20 chats per second at most.
pub struct TelegramBroadcaster {
    bot: BotType,
    pause: Duration,
}

impl TelegramBroadcaster {
    pub fn new(bot: BotType) -> Self {
        TelegramBroadcaster {
            bot,
            pause: Duration::from_millis(50),
        }
    }

    async fn send_report(&self, chat: ChatId, report: &Report) -> Result<(), RequestError> {
        for part in plan(report) {
            match part {
                Part::Text(text) => {
                    with_retry(chat, || self.bot.send_message(chat, text).send()).await?;
                }
                Part::Photo(photo, caption) => {
                    with_retry(chat, || {
                        let mut request =
                            self.bot.send_photo(chat, InputFile::file_id(photo.file_id.clone()));
                        if let Some(caption) = caption {
                            request = request.caption(caption);
                        }
                        request.send()
                    })
                    .await?;
                }
                Part::Album(photos, caption) => {
                    with_retry(chat, || {
                        let media = photos.iter().enumerate().map(|(i, photo)| {
                            let mut item =
                                InputMediaPhoto::new(InputFile::file_id(photo.file_id.clone()));
                            if let (0, Some(caption)) = (i, caption) {
                                item = item.caption(caption);
                            }
                            InputMedia::Photo(item)
                        });
                        self.bot.send_media_group(chat, media).send()
                    })
                    .await?;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Delivery for TelegramBroadcaster {
    async fn broadcast(&self, recipients: &[ChatId], report: &Report) -> Result<usize> {
        log::debug!(
            "Report text:\n{}\nReport media: {:?}",
            report.text,
            report.album
        );

        let mut count = 0;
        for chat in recipients {
            match self.send_report(*chat, report).await {
                Ok(()) => {
                    log::info!("Target [ID:{}]: success", chat);
                    count += 1;
                }
                Err(e) => log::error!("Target [ID:{}]: failed: {:?}", chat, e),
            }
            tokio::time::sleep(self.pause).await;
        }

        log::info!("{} reports successfully sent", count);
        Ok(count)
    }
}

async fn with_retry<T, F, Fut>(chat: ChatId, mut request: F) -> Result<T, RequestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RequestError>>,
{
    let mut attempt = 0;
    loop {
        match request().await {
            Err(RequestError::RetryAfter(wait)) if attempt < MAX_RETRIES => {
                attempt += 1;
                log::warn!(
                    "Target [ID:{}]: flood limit is exceeded, sleeping {:?}",
                    chat,
                    wait.duration()
                );
                tokio::time::sleep(wait.duration()).await;
            }
            result => return result,
        }
    }
}

pub async fn notify_stopped(bot: &BotType, admins: &[ChatId]) {
    for admin in admins {
        if let Err(e) = bot.send_message_easy(*admin, BOT_STOPPED).await {
            log::warn!("Could not notify admin {}: {:?}", admin, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::MessageId;

    fn report(text: &str, photos: i32) -> Report {
        Report {
            text: text.to_owned(),
            album: (1..=photos)
                .map(|id| Photo {
                    file_id: format!("file-{}", id),
                    message_id: MessageId(id),
                })
                .collect(),
        }
    }

    #[test]
    fn text_only_report_is_one_message() {
        let report = report("hello", 0);
        assert_eq!(plan(&report), vec![Part::Text("hello")]);
    }

    #[test]
    fn single_photo_carries_the_caption() {
        let report = report("hello", 1);
        assert_eq!(plan(&report), vec![Part::Photo(&report.album[0], Some("hello"))]);
    }

    #[test]
    fn long_text_goes_before_the_album() {
        let text = "x".repeat(CAPTION_LIMIT + 1);
        let report = report(&text, 3);

        let parts = plan(&report);

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], Part::Text(&text));
        assert_eq!(parts[1], Part::Album(&report.album, None));
    }

    #[test]
    fn big_albums_are_chunked() {
        let report = report("hello", 21);

        let parts = plan(&report);

        assert_eq!(
            parts,
            vec![
                Part::Album(&report.album[..10], Some("hello")),
                Part::Album(&report.album[10..20], None),
                Part::Photo(&report.album[20], None),
            ]
        );
    }

    #[test]
    fn oversized_report_is_split_on_line_breaks() {
        let line = format!("<b>Мастер:</b> {}\n", "а".repeat(80));
        let text = line.repeat(60);
        assert!(units(&text) > TEXT_LIMIT);
        let report = report(&text, 2);

        let parts = plan(&report);

        let pieces: Vec<&str> = parts
            .iter()
            .filter_map(|part| match part {
                Part::Text(piece) => Some(*piece),
                _ => None,
            })
            .collect();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces.concat(), text);
        for piece in &pieces {
            assert!(units(piece) <= TEXT_LIMIT);
            assert!(piece.ends_with('\n'));
        }
        assert_eq!(parts.last(), Some(&Part::Album(&report.album, None)));
    }

    #[test]
    fn long_line_is_never_cut_inside_an_entity() {
        let text = format!("{}{}", "x".repeat(TEXT_LIMIT - 2), "&lt;".repeat(10));

        let pieces = split_text(&text, TEXT_LIMIT);

        assert_eq!(pieces.concat(), text);
        assert_eq!(pieces[0].len(), TEXT_LIMIT - 2);
        assert!(pieces[1].starts_with("&lt;"));
    }

    #[test]
    fn long_line_is_never_cut_inside_a_tag() {
        let text = format!("{}<b>tail</b>", "x".repeat(TEXT_LIMIT - 1));

        let pieces = split_text(&text, TEXT_LIMIT);

        assert_eq!(pieces, vec!["x".repeat(TEXT_LIMIT - 1).as_str(), "<b>tail</b>"]);
    }
}
