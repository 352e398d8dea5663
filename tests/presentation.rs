//! Property tests for the node filter and stats, plus App-level flows
//! driven through the public API.

use clashview::app::{filter_indices, filter_nodes, App, NodeStats};
use clashview::subscription::{AggregationResult, Fetcher, ProxyNode};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn node_strategy() -> impl Strategy<Value = ProxyNode> {
    (
        "[a-zA-Z0-9 -]{0,12}",
        prop_oneof![
            Just("ss"),
            Just("SS"),
            Just("ssr"),
            Just("vmess"),
            Just("trojan"),
            Just("hysteria2"),
            Just(""),
        ],
        "[a-z0-9.]{0,16}",
    )
        .prop_map(|(name, proxy_type, server)| ProxyNode {
            name,
            proxy_type: proxy_type.to_string(),
            server,
            ..ProxyNode::default()
        })
}

fn matches_by_hand(node: &ProxyNode, query: &str) -> bool {
    let q = query.to_lowercase();
    node.name.to_lowercase().contains(&q)
        || node.proxy_type.to_lowercase().contains(&q)
        || node.server.to_lowercase().contains(&q)
}

proptest! {
    #[test]
    fn filter_returns_exactly_the_matching_subset_in_order(
        nodes in prop::collection::vec(node_strategy(), 0..40),
        query in "[a-zA-Z0-9.]{0,3}",
    ) {
        let indices = filter_indices(&nodes, &query);

        // Strictly increasing, so relative order is kept
        prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));

        for (i, node) in nodes.iter().enumerate() {
            prop_assert_eq!(indices.contains(&i), matches_by_hand(node, &query));
        }

        let filtered = filter_nodes(&nodes, &query);
        prop_assert_eq!(filtered.len(), indices.len());
    }

    #[test]
    fn filter_is_case_insensitive(
        nodes in prop::collection::vec(node_strategy(), 0..30),
        query in "[a-z]{1,3}",
    ) {
        prop_assert_eq!(
            filter_indices(&nodes, &query),
            filter_indices(&nodes, &query.to_uppercase())
        );
    }

    #[test]
    fn stats_buckets_sum_to_total(nodes in prop::collection::vec(node_strategy(), 0..40)) {
        let stats = NodeStats::from_nodes(&nodes);
        prop_assert_eq!(stats.total, nodes.len());
        prop_assert_eq!(stats.by_type.values().sum::<usize>(), nodes.len());
        prop_assert!(stats.shadowsocks_family() <= stats.total);
    }
}

fn typed(name: &str, proxy_type: &str) -> ProxyNode {
    ProxyNode {
        name: name.to_string(),
        proxy_type: proxy_type.to_string(),
        server: format!("{}.example.com", name.to_lowercase()),
        ..ProxyNode::default()
    }
}

#[test]
fn test_empty_query_matches_everything() {
    let nodes = vec![typed("a", "ss"), typed("b", "")];
    assert_eq!(filter_indices(&nodes, ""), vec![0, 1]);
}

#[test]
fn test_stats_count_exact_types() {
    let nodes = vec![
        typed("a", "ss"),
        typed("b", "SS"),
        typed("c", "ssr"),
        typed("d", "vmess"),
        typed("e", "trojan"),
    ];
    let stats = NodeStats::from_nodes(&nodes);

    assert_eq!(stats.total, 5);
    assert_eq!(stats.count("ss"), 1);
    assert_eq!(stats.count("SS"), 1);
    assert_eq!(stats.count("vmess"), 1);
    assert_eq!(stats.count("hysteria2"), 0);
    // The SS/SSR card counts lowercase tags only
    assert_eq!(stats.shadowsocks_family(), 2);
}

#[tokio::test]
async fn test_app_refresh_then_filter_flow() {
    let fetcher = Fetcher::new(reqwest::Client::new(), None, None);
    let mut app = App::new(
        fetcher,
        vec!["https://a.example/sub".to_string(), "  ".to_string()],
    );

    // Blank subscriptions are skipped
    let urls = app.begin_refresh().unwrap();
    assert_eq!(urls, vec!["https://a.example/sub".to_string()]);
    // Single flight
    assert!(app.begin_refresh().is_none());

    app.apply_refresh(AggregationResult {
        nodes: vec![typed("HK-01", "vmess"), typed("JP-01", "ss"), typed("HK-02", "trojan")],
        errors: vec!["Failed https://b.example/sub: 404".to_string()],
    });

    assert_eq!(app.stats.total, 3);
    assert_eq!(app.errors.len(), 1);
    assert!(app.last_updated.is_some());

    app.set_filter("hk");
    let visible: Vec<&str> = app.visible_nodes().map(|n| n.name.as_str()).collect();
    assert_eq!(visible, vec!["HK-01", "HK-02"]);

    app.nav_bottom();
    assert_eq!(app.selected_node().map(|n| n.name.as_str()), Some("HK-02"));

    // Narrowing the filter clamps the selection
    app.set_filter("hk-01");
    assert_eq!(app.selected_node().map(|n| n.name.as_str()), Some("HK-01"));

    // The next refresh clears old errors immediately
    app.begin_refresh();
    assert!(app.errors.is_empty());
    assert_eq!(app.nodes.len(), 3);
}
