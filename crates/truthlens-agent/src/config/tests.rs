#[cfg(test)]
mod tests {
    use super::super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.max_output_tokens, 12_000);
        assert_eq!(config.llm.thinking_budget, 4_000);
        assert_eq!(config.cache.ttl_hours, 24);
        assert_eq!(config.scoring.weights, ModuleWeights::default());
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }

    #[test]
    fn test_default_llm_matches_serde_defaults() {
        let parsed = Config::parse("[llm]\n").unwrap().llm;
        let built = LlmConfig::default();
        assert_eq!(parsed.model, built.model);
        assert_eq!(parsed.min_call_interval_ms, built.min_call_interval_ms);
    }

    #[test]
    fn test_custom_weights_and_sections() {
        let toml = r#"
            [llm]
            provider = "openai_compatible"
            model = "local-model"
            base_url = "http://localhost:8080"
            language = "English"

            [cache]
            ttl_hours = 6
            path = "cache/analyses.json"

            [scoring.weights]
            source = 1.0
            cross_check = 1.0
            logic = 1.0
            context = 1.0
            bias = 0.0
        "#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.llm.provider, "openai_compatible");
        assert_eq!(config.llm.language, Language::English);
        assert_eq!(config.cache.path, Some(PathBuf::from("cache/analyses.json")));
        assert_eq!(config.scoring.weights.total(), 4.0);
        assert_eq!(config.cache_ttl(), chrono::Duration::hours(6));
    }

    #[test]
    fn test_negative_weight_is_rejected() {
        let toml = r#"
            [scoring.weights]
            source = -5.0
            cross_check = 25.0
            logic = 20.0
            context = 15.0
            bias = 10.0
        "#;
        let err = Config::parse(toml).unwrap_err();
        assert!(err.to_string().contains("source"), "unexpected error: {err}");
    }

    #[test]
    fn test_non_positive_ttl_is_rejected() {
        assert!(Config::parse("[cache]\nttl_hours = 0\n").is_err());
    }

    #[test]
    fn test_oversized_ttl_is_rejected() {
        let err = Config::parse(&format!("[cache]\nttl_hours = {}\n", i64::MAX)).unwrap_err();
        assert!(err.to_string().contains("too large"));
        // Largest representable value still loads
        let max_hours = chrono::Duration::MAX.num_hours();
        let config = Config::parse(&format!("[cache]\nttl_hours = {max_hours}\n")).unwrap();
        assert_eq!(config.cache_ttl(), chrono::Duration::hours(max_hours));
    }

    #[test]
    fn test_cache_ttl_falls_back_when_out_of_range() {
        let mut config = Config::default();
        config.cache.ttl_hours = i64::MAX;
        assert_eq!(config.cache_ttl(), truthlens_pipeline::default_ttl());
    }

    #[test]
    fn test_env_fills_missing_key_and_overrides_bind() {
        let env: HashMap<&str, &str> =
            [(GEMINI_KEY_ENV, "env-key"), (BIND_ENV, "0.0.0.0:8080")].into_iter().collect();
        let mut config = Config::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.llm.api_key, "env-key");
        assert_eq!(config.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_file_key_takes_precedence_over_env() {
        let mut config = Config::parse("[llm]\napi_key = \"file-key\"\n").unwrap();
        config.apply_env(|k| (k == GEMINI_KEY_ENV).then(|| "env-key".to_string()));
        assert_eq!(config.llm.api_key, "file-key");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load_from("/nonexistent/truthlens.toml").unwrap();
        assert_eq!(config.llm.model, default_model());
    }

    #[test]
    fn test_analyzer_config_carries_llm_settings() {
        let mut config = Config::default();
        config.llm.thinking_budget = 0;
        config.llm.min_call_interval_ms = 250;
        let analyzer = config.analyzer_config();
        assert_eq!(analyzer.thinking_budget, Some(0));
        assert_eq!(analyzer.min_call_interval, Duration::from_millis(250));
        assert_eq!(analyzer.max_grounding_sources, 5);
    }
}
