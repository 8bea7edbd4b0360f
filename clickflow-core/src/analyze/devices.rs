//! User-agent device classification.

use std::collections::HashMap;

use crate::types::{DeviceClass, PageVisit};

/// Classify a user-agent string into a coarse device category.
///
/// Substring checks, case-insensitive: android and iPhone count as
/// mobile, iPad as tablet, Windows (without a Linux marker) as desktop.
/// Anything else — bots, macOS, Linux, missing user agents — lands in
/// `Other`.
pub fn classify(user_agent: Option<&str>) -> DeviceClass {
    let Some(ua) = user_agent else {
        return DeviceClass::Other;
    };
    let ua = ua.to_lowercase();
    if ua.contains("android") || ua.contains("iphone") {
        DeviceClass::Mobile
    } else if ua.contains("ipad") {
        DeviceClass::Tablet
    } else if ua.contains("windows") && !ua.contains("linux") {
        DeviceClass::Desktop
    } else {
        DeviceClass::Other
    }
}

/// Visit counts per device category.
pub fn breakdown(visits: &[PageVisit]) -> HashMap<DeviceClass, u64> {
    let mut counts = HashMap::new();
    for visit in visits {
        *counts.entry(classify(visit.user_agent.as_deref())).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProjectId, VisitId};
    use chrono::Utc;

    #[test]
    fn common_user_agents() {
        assert_eq!(
            classify(Some("Mozilla/5.0 (Linux; Android 14; Pixel 8)")),
            DeviceClass::Mobile
        );
        assert_eq!(
            classify(Some("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)")),
            DeviceClass::Mobile
        );
        assert_eq!(
            classify(Some("Mozilla/5.0 (iPad; CPU OS 17_0)")),
            DeviceClass::Tablet
        );
        assert_eq!(
            classify(Some("Mozilla/5.0 (Windows NT 10.0; Win64; x64)")),
            DeviceClass::Desktop
        );
        assert_eq!(
            classify(Some("Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0)")),
            DeviceClass::Other
        );
        assert_eq!(classify(None), DeviceClass::Other);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify(Some("ANDROID")), DeviceClass::Mobile);
        assert_eq!(classify(Some("WiNdOwS")), DeviceClass::Desktop);
    }

    #[test]
    fn windows_marker_under_linux_is_not_desktop() {
        // Browsers under Wine report both platforms; the Linux marker wins.
        assert_eq!(
            classify(Some("Mozilla/5.0 (X11; Linux x86_64; Windows NT 10.0; Wine)")),
            DeviceClass::Other
        );
    }

    #[test]
    fn breakdown_counts_per_class() {
        let visit = |ua: Option<&str>| PageVisit {
            id: VisitId(0),
            project_id: ProjectId::new(),
            url: "/".to_string(),
            referrer: None,
            user_agent: ua.map(str::to_string),
            visited_at: Utc::now(),
        };
        let visits = vec![
            visit(Some("android")),
            visit(Some("iphone")),
            visit(Some("windows")),
            visit(None),
        ];
        let counts = breakdown(&visits);
        assert_eq!(counts.get(&DeviceClass::Mobile), Some(&2));
        assert_eq!(counts.get(&DeviceClass::Desktop), Some(&1));
        assert_eq!(counts.get(&DeviceClass::Other), Some(&1));
        assert_eq!(counts.values().sum::<u64>(), visits.len() as u64);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn classification_is_total(ua in any::<Option<String>>()) {
                // Any input maps to exactly one category without panicking.
                let _ = classify(ua.as_deref());
            }
        }
    }
}
