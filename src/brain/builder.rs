// CompletionRequestBuilder - chainable builder for CompletionRequest

use super::CompletionRequest;

pub struct CompletionRequestBuilder {
    prompt: String,
    grammar: Option<String>,
    n_predict: u32,
    stream: bool,
    cache_prompt: bool,
    temperature: Option<f32>,
    top_p: Option<f32>,
    top_k: Option<u32>,
}

impl CompletionRequestBuilder {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            grammar: None,
            n_predict: 512,
            stream: false,
            cache_prompt: true,
            temperature: None,
            top_p: None,
            top_k: None,
        }
    }

    pub fn grammar(mut self, grammar: impl Into<String>) -> Self {
        let grammar = grammar.into();
        self.grammar = (!grammar.trim().is_empty()).then_some(grammar);
        self
    }

    pub fn max_tokens(mut self, n_predict: u32) -> Self {
        self.n_predict = n_predict;
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn top_p(mut self, top_p: Option<f32>) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn top_k(mut self, top_k: Option<u32>) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn build(self) -> Result<CompletionRequest, &'static str> {
        if self.prompt.is_empty() {
            return Err("prompt cannot be empty");
        }
        if self.n_predict == 0 {
            return Err("max_tokens must be positive");
        }

        Ok(CompletionRequest {
            prompt: self.prompt,
            grammar: self.grammar,
            n_predict: self.n_predict,
            stream: self.stream,
            cache_prompt: self.cache_prompt,
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
        })
    }
}
