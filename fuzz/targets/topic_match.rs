#![no_main]

use arbitrary::Arbitrary;
use authplug::{matches_filter, TopicTemplate};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    template: &'a str,
    username: &'a str,
    topic: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    let template = TopicTemplate::new(input.template);
    let expanded = template.expand(input.username);
    assert!(expanded.len() <= template.expanded_capacity(input.username));

    let direct = matches_filter(&expanded, input.topic);
    if direct {
        assert!(template.permits(input.username, input.topic));
    }
    if !input.topic.contains(['+', '#']) && !input.topic.is_empty() && !input.topic.starts_with('$') {
        assert!(matches_filter("#", input.topic));
    }
});
