//! End-to-end extraction over representative page snapshots.

use chrono::{TimeZone, Utc};
use harmwatch_extract::{extract_from_html, is_iso_datetime, ExtractorChain, Page};

fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 4, 8, 30, 0).unwrap()
}

#[test]
fn twitter_status_page_normalizes_counters_and_tags() {
    let html = r#"
        <html><body>
          <article role="article">
            <a href="/civic_alerts">Civic Alerts</a>
            <a href="/civic_alerts/status/1800000000000000000">
              <time datetime="2024-07-03T21:14:09.000Z">Jul 3</time>
            </a>
            <div lang="en">Heat advisory tonight #heat #Heat #heat</div>
            <div data-testid="reply">87</div>
            <div data-testid="retweet">1.2K</div>
            <div data-testid="like">12,408</div>
          </article>
        </body></html>
    "#;
    let post = extract_from_html(html, "https://twitter.com/home", fixed_now());

    assert_eq!(post.platform, "twitter");
    assert_eq!(post.user_id.as_deref(), Some("civic_alerts"));
    assert_eq!(post.post_id.as_deref(), Some("1800000000000000000"));
    assert_eq!(post.timestamp, "2024-07-03T21:14:09.000Z");
    assert_eq!(post.hashtags, vec!["#heat", "#Heat"]);
    assert_eq!(post.comments, 87);
    assert_eq!(post.shares, 1200);
    assert_eq!(post.likes, 12_408);
    assert_eq!(post.source_url, "https://twitter.com/home");
}

#[test]
fn structured_data_beats_generic_containers() {
    let html = r#"
        <html><head>
          <script type="application/ld+json">
            {"@type": "DiscussionForumPosting",
             "author": "moderator",
             "datePublished": "July 2, 2024",
             "text": "Thread about #transit delays"}
          </script>
        </head><body>
          <div>Navigation Home About Contact Terms Privacy Sitemap Careers</div>
        </body></html>
    "#;
    let post = extract_from_html(html, "https://forum.example.org/t/9", fixed_now());

    assert_eq!(post.platform, "structured");
    assert_eq!(post.user_id.as_deref(), Some("moderator"));
    assert_eq!(post.timestamp, "2024-07-02T00:00:00.000Z");
    assert_eq!(post.hashtags, vec!["#transit"]);
}

#[test]
fn blank_page_gets_defaults() {
    let page = Page::parse("<html><body></body></html>", "https://example.com/empty");
    let post = ExtractorChain::default().extract(&page, fixed_now());

    assert_eq!(post.platform, "generic");
    assert!(post.post_text.is_empty());
    assert!(post.hashtags.is_empty());
    assert_eq!(post.timestamp, "2024-07-04T08:30:00.000Z");
    assert!(is_iso_datetime(&post.timestamp));
    assert_eq!((post.likes, post.comments, post.shares), (0, 0, 0));
}
