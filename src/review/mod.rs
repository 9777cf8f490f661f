//! Interactive approval gate.
//!
//! Walks the operator through a candidate batch on any line-oriented
//! input/output pair: approve or reject each post, edit its content or
//! date, then optionally append new posts.

use std::io::{self, BufRead, Write};

use crate::core::{parse_schedule_date, CampaignPost, Platform};

/// Counts reported at the end of a review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    pub approved: usize,
    pub rejected: usize,
    pub added: usize,
}

/// Line-oriented reviewer over an input and an output stream.
pub struct Reviewer<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Reviewer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Review `posts` in place.
    ///
    /// End of input stops the review; posts not yet reached keep their
    /// current approval flag.
    pub fn review(&mut self, posts: &mut Vec<CampaignPost>) -> io::Result<ReviewSummary> {
        let total = posts.len();
        let mut index = 0;

        'posts: while index < total {
            let post = &mut posts[index];
            writeln!(
                self.output,
                "\n[{}/{}] {} on {}\n{}\n",
                index + 1,
                total,
                post.platform,
                post.scheduled_date,
                post.content
            )?;

            loop {
                let Some(answer) =
                    self.ask("Approve? [Y]es / [n]o / [e]dit text / [d]ate / [q]uit review: ")?
                else {
                    break 'posts;
                };

                match answer.to_lowercase().as_str() {
                    "" | "y" | "yes" => {
                        post.approved = true;
                        break;
                    }
                    "n" | "no" => {
                        post.approved = false;
                        break;
                    }
                    "e" | "edit" => {
                        if let Some(content) = self.ask("New content: ")? {
                            if !content.is_empty() {
                                post.content = content;
                            }
                        }
                    }
                    "d" | "date" => {
                        if let Some(date) = self.ask("New date (YYYY-MM-DD): ")? {
                            if parse_schedule_date(&date).is_err() {
                                writeln!(
                                    self.output,
                                    "Warning: '{date}' is not YYYY-MM-DD; this post will be skipped when scheduling."
                                )?;
                            }
                            post.scheduled_date = date;
                        }
                    }
                    "q" | "quit" => break 'posts,
                    _ => writeln!(self.output, "Please answer y, n, e, d or q.")?,
                }
            }

            index += 1;
        }

        let added = self.add_posts(posts)?;
        let approved = posts.iter().filter(|p| p.approved).count();

        Ok(ReviewSummary { approved, rejected: posts.len() - approved, added })
    }

    fn add_posts(&mut self, posts: &mut Vec<CampaignPost>) -> io::Result<usize> {
        let mut added = 0;

        while let Some(answer) = self.ask("\nAdd another post? [y/N]: ")? {
            if !matches!(answer.to_lowercase().as_str(), "y" | "yes") {
                break;
            }

            let Some(platform) = self.ask_platform()? else { break };
            let Some(content) = self.ask("Content: ")? else { break };
            let Some(date) = self.ask("Date (YYYY-MM-DD): ")? else { break };

            if content.is_empty() {
                writeln!(self.output, "Empty post discarded.")?;
                continue;
            }

            posts.push(CampaignPost { platform, content, scheduled_date: date, approved: true });
            added += 1;
        }

        Ok(added)
    }

    fn ask_platform(&mut self) -> io::Result<Option<Platform>> {
        loop {
            let Some(answer) = self.ask("Platform (twitter/linkedin): ")? else {
                return Ok(None);
            };
            match answer.parse() {
                Ok(platform) => return Ok(Some(platform)),
                Err(e) => writeln!(self.output, "{e}")?,
            }
        }
    }

    /// Prompt and read one trimmed line; `None` at end of input.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Print a candidate batch as a compact table.
pub fn print_posts<W: Write>(output: &mut W, posts: &[CampaignPost]) -> io::Result<()> {
    writeln!(output, "{:<3} {:<9} {:<10} {:<10} Content", "#", "Approved", "Platform", "Date")?;
    for (i, post) in posts.iter().enumerate() {
        let content: String = post.content.chars().take(60).collect();
        let ellipsis = if post.content.chars().count() > 60 { "…" } else { "" };
        writeln!(
            output,
            "{:<3} {:<9} {:<10} {:<10} {content}{ellipsis}",
            i + 1,
            if post.approved { "yes" } else { "no" },
            post.platform.name(),
            post.scheduled_date,
        )?;
    }
    Ok(())
}
