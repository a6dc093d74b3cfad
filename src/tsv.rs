//! Tab-delimited snapshot line format
//!
//! One item per line, 17 tab-separated columns. Free-text columns are
//! escaped so a record always splits into exactly 17 fields; the first
//! column is always the item ID, which the resume scan relies on.

use chrono::DateTime;

use crate::types::Item;

/// Marker substituted for a literal horizontal tab inside a field
pub const TAB_MARKER: &str = r"<_\t_>";
/// Marker substituted for a literal carriage return inside a field
pub const CR_MARKER: &str = r"<_\r_>";
/// Marker substituted for a literal line feed inside a field
pub const LF_MARKER: &str = r"<_\n_>";

/// Escape the delimiter characters in a free-text field.
///
/// Replaces every tab, carriage return, and line feed with its marker, in
/// that order. The markers contain none of the raw characters, so the
/// replacement order cannot cascade.
///
/// Marker text that already appears literally in the input is not itself
/// escaped: [`unescape`] cannot distinguish it from an escaped character,
/// so such a field does not survive a round trip. The deployed snapshot
/// format has always had this ambiguity and downstream consumers parse it
/// as-is, so it is kept rather than fixed with an incompatible scheme.
pub fn escape(text: &str) -> String {
    text.replace('\t', TAB_MARKER)
        .replace('\r', CR_MARKER)
        .replace('\n', LF_MARKER)
}

/// Invert [`escape`], restoring tabs, carriage returns, and line feeds.
///
/// The fetch pipeline never calls this; it exists for downstream readers
/// of the snapshot. See [`escape`] for the marker-collision caveat.
pub fn unescape(text: &str) -> String {
    text.replace(LF_MARKER, "\n")
        .replace(CR_MARKER, "\r")
        .replace(TAB_MARKER, "\t")
}

/// Format one item as a snapshot line (no trailing newline).
///
/// Columns, in order: `id`, `date` (YYYY-MM-DD, UTC), `HH:MM` (UTC),
/// Unix time, type, deleted, dead, by, score, descendants, parent, poll,
/// kids (comma-joined), parts (comma-joined), title, url, text.
/// The `by`, `title`, `url`, and `text` columns are escaped.
pub fn format_line(item: &Item) -> String {
    let timestamp =
        DateTime::from_timestamp(item.time, 0).unwrap_or(chrono::DateTime::UNIX_EPOCH);

    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        item.id,
        timestamp.format("%Y-%m-%d"),
        timestamp.format("%H:%M"),
        item.time,
        item.kind,
        item.deleted,
        item.dead,
        escape(&item.by),
        item.score,
        item.descendants,
        item.parent,
        item.poll,
        join_ids(&item.kids),
        join_ids(&item.parts),
        escape(&item.title),
        escape(&item.url),
        escape(&item.text),
    )
}

/// Parse the leading ID column of a snapshot line.
///
/// Returns `None` for an empty or non-numeric first field; the caller
/// treats that as a corrupt file.
pub fn leading_id(line: &str) -> Option<u64> {
    let field = line.split('\t').next()?;
    field.parse().ok()
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_replaces_all_three_delimiters() {
        assert_eq!(escape("A\tB\nC"), r"A<_\t_>B<_\n_>C");
        assert_eq!(escape("x\ry"), r"x<_\r_>y");
        assert_eq!(escape("plain text"), "plain text");
    }

    #[test]
    fn unescape_inverts_escape() {
        let original = "line one\nline two\twith\ttabs\r\n";
        assert_eq!(unescape(&escape(original)), original);
    }

    #[test]
    fn escape_of_delimiter_free_text_is_identity() {
        let text = "no special characters here, just words";
        assert_eq!(escape(text), text);
        assert_eq!(unescape(text), text);
    }

    #[test]
    fn literal_marker_text_does_not_round_trip() {
        // Known, accepted ambiguity: a field already containing marker text
        // decodes to the raw character instead of the original marker.
        let tricky = r"<_\t_>";
        assert_eq!(unescape(&escape(tricky)), "\t");
    }

    #[test]
    fn format_line_has_exactly_17_fields() {
        let item = Item {
            id: 8863,
            kind: "story".into(),
            by: "dhouston".into(),
            time: 1175714200,
            kids: vec![9224, 8917],
            score: 104,
            title: "My YC app: Dropbox".into(),
            url: "http://www.getdropbox.com/u/2/screencast.html".into(),
            descendants: 71,
            ..Default::default()
        };

        let line = format_line(&item);
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 17);
        assert_eq!(fields[0], "8863");
        assert_eq!(fields[1], "2007-04-04");
        assert_eq!(fields[2], "19:16");
        assert_eq!(fields[3], "1175714200");
        assert_eq!(fields[4], "story");
        assert_eq!(fields[5], "false");
        assert_eq!(fields[6], "false");
        assert_eq!(fields[7], "dhouston");
        assert_eq!(fields[8], "104");
        assert_eq!(fields[9], "71");
        assert_eq!(fields[12], "9224,8917");
        assert_eq!(fields[14], "My YC app: Dropbox");
    }

    #[test]
    fn deleted_item_serializes_with_zero_columns() {
        let item: Item =
            serde_json::from_str(r#"{"id":42,"deleted":true,"type":"comment"}"#).unwrap();

        let line = format_line(&item);
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 17);
        assert_eq!(fields[0], "42");
        assert_eq!(fields[4], "comment");
        assert_eq!(fields[5], "true"); // deleted
        assert_eq!(fields[6], "false"); // dead
        assert_eq!(fields[7], ""); // by
        assert_eq!(fields[8], "0"); // score
        assert_eq!(fields[9], "0"); // descendants
        assert_eq!(fields[10], "0"); // parent
        assert_eq!(fields[11], "0"); // poll
        assert_eq!(fields[12], ""); // kids
        assert_eq!(fields[13], ""); // parts
        assert_eq!(fields[14], ""); // title
        assert_eq!(fields[15], ""); // url
        assert_eq!(fields[16], ""); // text
    }

    #[test]
    fn embedded_delimiters_stay_on_one_line() {
        let item = Item {
            id: 1,
            title: "A\tB\nC".into(),
            text: "first\nsecond".into(),
            ..Default::default()
        };

        let line = format_line(&item);
        assert!(!line.contains('\n'));
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 17);
        assert_eq!(fields[14], r"A<_\t_>B<_\n_>C");
        assert_eq!(fields[16], r"first<_\n_>second");
    }

    #[test]
    fn zero_timestamp_formats_as_epoch() {
        let item = Item {
            id: 1,
            ..Default::default()
        };
        let line = format_line(&item);
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields[1], "1970-01-01");
        assert_eq!(fields[2], "00:00");
    }

    #[test]
    fn leading_id_parses_first_column() {
        assert_eq!(leading_id("123\tstuff\tmore"), Some(123));
        assert_eq!(leading_id("7"), Some(7));
        assert_eq!(leading_id("abc\tstuff"), None);
        assert_eq!(leading_id(""), None);
        assert_eq!(leading_id("\tleading tab"), None);
    }
}
