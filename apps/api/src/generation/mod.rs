// Definition generation: compose the prompt, hand it to the model, clean the answer.
// All model calls go through the DefinitionWriter trait; llm_client is one backend.

pub mod generator;
pub mod handlers;
pub mod prompts;
