//! Page-side payloads.
//!
//! Plans are shipped as JSON to one fixed runtime, so every site shares the same
//! fallback logic and only the data differs.

use super::plan::ExtractionPlan;
use serde::Serialize;
use tracing::error;

/// Interprets a serialized [`ExtractionPlan`] against `document`. Must stay in
/// step with `engine.rs`.
const RUNTIME: &str = r#"(function (plan) {
  try {
    var lower = function (value) { return String(value || '').toLowerCase(); };
    var chars = function (value) { return Array.from(String(value || '')).length; };
    var query = function (selector) {
      try { return Array.prototype.slice.call(document.querySelectorAll(selector)); } catch (e) { return []; }
    };
    var texts = function (selector) {
      return query(selector).map(function (el) { return (el.textContent || '').trim(); });
    };
    var meta = function (key) {
      var found = query('meta[property="' + key + '"]').concat(query('meta[name="' + key + '"]'));
      for (var i = 0; i < found.length; i++) {
        var content = (found[i].getAttribute('content') || '').trim();
        if (content) return content;
      }
      return '';
    };
    var rejected = function (value, tokens) {
      var v = lower(value);
      return tokens.some(function (t) { return t && v.indexOf(lower(t)) !== -1; });
    };
    var tidy = function (value, field) {
      var v = String(value || '');
      field.clean.forEach(function (fragment) { v = v.split(fragment).join(''); });
      return v.replace(/\s+/g, ' ').replace(/[\s,]+$/, '').trim();
    };
    var firstSegment = function (title) {
      return String(title || '').split('|')[0].split(' - ')[0].split(' – ')[0].trim();
    };
    var images = function () {
      return query('img').map(function (img) {
        return { src: img.src || '', alt: (img.alt || '').trim(), width: img.width || 0, height: img.height || 0 };
      });
    };
    var candidate = function (s, field, title) {
      var usable = function (v) { return !!v && !rejected(v, field.reject); };
      var i, v;
      switch (s.kind) {
        case 'first':
          return texts(s.selector).filter(function (t) { return chars(t) >= Math.max(s.min_len, 1) && usable(t); })[0] || '';
        case 'longest':
          var exclude = s.exclude.map(lower);
          return texts(s.selector).reduce(function (best, t) {
            return usable(t) && exclude.indexOf(lower(t)) === -1 && chars(t) > chars(best) ? t : best;
          }, '');
        case 'attr':
          return query(s.selector).map(function (el) {
            var raw = (s.attr === 'src' || s.attr === 'href') ? el[s.attr] : el.getAttribute(s.attr);
            return String(raw || '').trim();
          }).filter(usable)[0] || '';
        case 'meta':
          for (i = 0; i < s.keys.length; i++) {
            v = meta(s.keys[i]);
            if (usable(v)) return v;
          }
          return '';
        case 'document_title':
          return firstSegment(document.title);
        case 'image_by_alt':
          var wanted = lower(title);
          return (images().filter(function (img) {
            var alt = lower(img.alt);
            var named = s.keywords.some(function (k) { return alt.indexOf(lower(k)) !== -1; }) ||
              (s.include_title && wanted && alt.indexOf(wanted) !== -1);
            return alt && named && !rejected(img.alt, field.reject) && usable(img.src);
          })[0] || {}).src || '';
        case 'large_image':
          return (images().filter(function (img) {
            return img.width > s.min_width && img.height > s.min_height && usable(img.src);
          })[0] || {}).src || '';
        case 'labelled':
          var label = lower(s.label);
          return texts(s.selector).filter(function (t) {
            return lower(t).indexOf(label) !== -1 && t.indexOf(':') !== -1;
          }).map(function (t) { return t.slice(t.indexOf(':') + 1).trim(); }).filter(usable)[0] || '';
      }
      return '';
    };
    var textField = function (field, title) {
      for (var i = 0; i < field.strategies.length; i++) {
        var v = tidy(candidate(field.strategies[i], field, title), field);
        if (v && !rejected(v, field.reject)) return v;
      }
      return '';
    };
    var listField = function (field) {
      var values = [];
      for (var i = 0; i < field.strategies.length; i++) {
        var s = field.strategies[i];
        if (s.kind === 'all') values = texts(s.selector).filter(Boolean);
        else if (s.kind === 'first') values = texts(s.selector).filter(Boolean).slice(0, 1);
        else if (s.kind === 'fixed') values = s.values.slice();
        if (values.length) break;
      }
      var out = [];
      values.concat(field.append).forEach(function (value) {
        var v = String(value).trim().replace(/[\s,;:.·]+$/, '').trim();
        if (v && out.indexOf(v) === -1) out.push(v);
      });
      return out.slice(0, plan.max_genres);
    };
    var classify = function (text) {
      var t = lower(text);
      if (t.indexOf('ongoing') !== -1) return 'ongoing';
      if (t.indexOf('complete') !== -1 || t.indexOf('finished') !== -1) return 'completed';
      if (t.indexOf('hiatus') !== -1) return 'hiatus';
      if (t.indexOf('cancelled') !== -1 || t.indexOf('canceled') !== -1 || t.indexOf('dropped') !== -1) return 'cancelled';
      return '';
    };
    var statusField = function (field) {
      for (var i = 0; i < field.sources.length; i++) {
        var s = field.sources[i], found = '';
        if (s.kind === 'element') found = classify(texts(s.selector)[0]);
        else if (s.kind === 'labelled') found = classify(texts(s.selector).filter(function (t) {
          return lower(t).indexOf(lower(s.label)) !== -1;
        })[0]);
        else if (s.kind === 'fixed') found = s.status;
        if (found) return found;
      }
      return field['default'];
    };
    var sourceUrl = function (rule) {
      var href = String(window.location.href).split('#')[0].split('?')[0];
      var suffix = rule.canonical_suffix;
      if (suffix && href.slice(-suffix.length) !== suffix) {
        href = href.split(suffix)[0].replace(/\/+$/, '') + suffix;
      }
      return href;
    };

    var data = {};
    var title = textField(plan.title, '');
    var description = textField(plan.description, title);
    if (description) data.description = Array.from(description).slice(0, plan.description_limit).join('');
    var cover = textField(plan.cover_image, title);
    if (cover) data.coverImage = cover;
    var author = textField(plan.author, title);
    if (author) data.author = author;
    var artist = textField(plan.artist, title);
    if (artist) data.artist = artist;
    var genres = listField(plan.genres);
    if (genres.length) data.genres = genres;
    data.mangaStatus = statusField(plan.status);
    if (title) data.title = title;
    data.sourceUrl = sourceUrl(plan.source_url);
    data.sourceWebsite = plan.site;
    return JSON.stringify(data);
  } catch (e) {
    return JSON.stringify({ error: String((e && e.message) || e) });
  }
})"#;

/// Collects what common selectors and meta tags match on an unknown site.
const PROBE_RUNTIME: &str = r#"(function (selectors) {
  try {
    var report = { _isDebugAdapter: true, url: window.location.href, title: document.title, selectors: {}, meta: {} };
    Object.keys(selectors).forEach(function (group) {
      report.selectors[group] = {};
      selectors[group].forEach(function (selector) {
        try {
          var el = document.querySelector(selector);
          if (el) {
            report.selectors[group][selector] = el.tagName === 'IMG' ? (el.src || '') : (el.textContent || '').trim().substring(0, 200);
          }
        } catch (e) {}
      });
    });
    Array.prototype.slice.call(document.querySelectorAll('meta')).forEach(function (m) {
      var key = m.getAttribute('property') || m.getAttribute('name');
      if (key) report.meta[key] = m.getAttribute('content') || '';
    });
    return JSON.stringify(report);
  } catch (e) {
    return JSON.stringify({ error: String((e && e.message) || e) });
  }
})"#;

/// Serializes `value` as a JavaScript literal safe to splice into a script.
fn js_literal<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    Ok(json
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
        .replace("</", "<\\/"))
}

/// An expression that evaluates to a JSON string carrying only `{error}`.
fn error_expression(message: &str) -> String {
    let body = serde_json::json!({ "error": message }).to_string();
    let literal = js_literal(&body).unwrap_or_else(|_| "\"{\\\"error\\\":\\\"unavailable\\\"}\"".to_string());
    format!("({})", literal)
}

/// Renders `plan` into a self-contained expression evaluating to the JSON result.
pub fn render_plan(plan: &ExtractionPlan) -> String {
    match js_literal(plan) {
        Ok(literal) => format!("{}({})", RUNTIME, literal),
        Err(e) => {
            error!("[SCRIPT] Failed to serialize plan for {}: {}", plan.site, e);
            error_expression(&format!("plan unavailable: {}", e))
        }
    }
}

/// Renders a selector probe; `groups` maps a field name to candidate selectors.
pub fn render_probe(groups: &[(&str, &[&str])]) -> String {
    let map: serde_json::Map<String, serde_json::Value> = groups
        .iter()
        .map(|(group, selectors)| ((*group).to_string(), serde_json::json!(selectors)))
        .collect();
    match js_literal(&map) {
        Ok(literal) => format!("{}({})", PROBE_RUNTIME, literal),
        Err(e) => error_expression(&format!("probe unavailable: {}", e)),
    }
}

/// Wraps a raw extraction expression so its result is posted through `bridge`
/// and also returned as the script's completion value. Exceptions become `{error}`.
pub fn wrap_for_bridge(raw_script: &str, bridge: &str) -> String {
    format!(
        r#"(function () {{
  var bridge = {bridge};
  var post = function (message) {{
    if (bridge && typeof bridge.postMessage === 'function') {{
      bridge.postMessage(message);
    }}
  }};
  try {{
    var result = {raw_script};
    post(result);
    return result;
  }} catch (e) {{
    var failure = JSON.stringify({{ error: String((e && e.message) || e) }});
    post(failure);
    return failure;
  }}
}})();
true;"#,
        bridge = bridge,
        raw_script = raw_script
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::plan::{PlanLimits, Strategy, TextField};

    #[test]
    fn rendered_plan_embeds_serialized_chains() {
        let mut plan = ExtractionPlan::generic("WeebCentral", PlanLimits::default());
        plan.title = TextField::new(vec![Strategy::first("h1")]).clean(&[" | Weeb Central"]);
        let script = render_plan(&plan);

        assert!(script.starts_with("(function (plan)"));
        assert!(script.contains(r#""site":"WeebCentral""#));
        assert!(script.contains(r#""kind":"first","selector":"h1","min_len":1"#));
        assert!(script.contains(r#""clean":[" | Weeb Central"]"#));
    }

    #[test]
    fn literal_escapes_script_terminators() {
        let literal = js_literal("a</script>\u{2028}b").unwrap();
        assert_eq!(literal, "\"a<\\/script>\\u2028b\"");
    }

    #[test]
    fn envelope_posts_and_returns_result() {
        let wrapped = wrap_for_bridge("(\"{}\")", "window.ReactNativeWebView");
        assert!(wrapped.contains("var bridge = window.ReactNativeWebView;"));
        assert!(wrapped.contains("var result = (\"{}\");"));
        assert!(wrapped.contains("post(failure);"));
        assert!(wrapped.trim_end().ends_with("true;"));
    }

    #[test]
    fn probe_lists_selector_groups() {
        let script = render_probe(&[("titles", &["h1", "h1.title"])]);
        assert!(script.contains("_isDebugAdapter"));
        assert!(script.contains(r#"{"titles":["h1","h1.title"]}"#));
    }
}
