use clap::ValueEnum;

const SUMMARY_JA: &str = "
以下の内容を、問いへの答えを直接的に説明する簡潔な段落にまとめてください。
要点を明確かつ網羅的に盛り込みつつ、分かりやすさを維持してください。
問い:{query}
Content:{content}
";

const ANSWER_JA: &str = "
以下のユーザーの質問と提示された内容をもとに、内容から関連情報を用いて直接的に回答を生成してください。
回答は明確かつ簡潔に構成し、さらに回答の要点を簡単にまとめた概要を付け加えてください。
Answerは日本語でお願いします。
質問:{question}
内容:{context}
Answer:
";

const SUMMARY_EN: &str = "
Condense the following content into one concise paragraph that directly explains the answer to the question.
Cover the key points clearly and thoroughly while keeping it easy to read.
Question: {query}
Content: {content}
";

const ANSWER_EN: &str = "
Using the user's question and the provided content below, write a direct answer based on the relevant information in the content.
Keep the answer clear and concise, then append a brief summary of its key points.
Question: {question}
Content: {context}
Answer:
";

/// A fixed instruction text with `{name}` slots.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate(&'static str);

impl PromptTemplate {
    /// Fills the named slots in one pass.
    ///
    /// Braces inside substituted values are never expanded, and slots with no
    /// matching variable stay in the output verbatim.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let extra: usize = vars.iter().map(|(_, v)| v.len()).sum();
        let mut out = String::with_capacity(self.0.len() + extra);
        let mut rest = self.0;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let value = after.find('}').and_then(|close| {
                let name = &after[..close];
                vars.iter()
                    .find(|(k, _)| *k == name)
                    .map(|(_, v)| (*v, close))
            });
            match value {
                Some((v, close)) => {
                    out.push_str(v);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Language of the instruction templates (and of the requested answer).
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lang {
    Ja,
    #[default]
    En,
}

impl Lang {
    /// Slots: `query`, `content`.
    pub fn summary_template(self) -> PromptTemplate {
        match self {
            Lang::Ja => PromptTemplate(SUMMARY_JA),
            Lang::En => PromptTemplate(SUMMARY_EN),
        }
    }

    /// Slots: `question`, `context`.
    pub fn answer_template(self) -> PromptTemplate {
        match self {
            Lang::Ja => PromptTemplate(ANSWER_JA),
            Lang::En => PromptTemplate(ANSWER_EN),
        }
    }
}
