use async_trait::async_trait;
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use aigentic_core::{AgentError, Parameter, Tool, ToolArguments, ToolError, ToolName};
use aigentic_schema::parameters_for;

type TypedHandler<A, R> = Arc<dyn Fn(A) -> BoxFuture<'static, Result<R, ToolError>> + Send + Sync>;

/// Tool whose arguments are a struct `A` and whose result `R` is JSON-encoded.
///
/// The parameter list is derived from `A`'s schema, so the declared schema and the decoded
/// type cannot drift apart.
pub struct TypedTool<A, R> {
    name: ToolName,
    description: Option<String>,
    parameters: Vec<Parameter>,
    handler: TypedHandler<A, R>,
    _marker: PhantomData<fn(A) -> R>,
}

impl<A, R> TypedTool<A, R>
where
    A: DeserializeOwned + JsonSchema + Send + 'static,
    R: Serialize + Send + 'static,
{
    pub fn new<F, Fut>(name: impl Into<String>, handler: F) -> Result<Self, AgentError>
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ToolError>> + Send + 'static,
    {
        Ok(Self {
            name: ToolName::new(name)?,
            description: None,
            parameters: parameters_for::<A>()?,
            handler: Arc::new(move |args| Box::pin(handler(args))),
            _marker: PhantomData,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[async_trait]
impl<A, R> Tool for TypedTool<A, R>
where
    A: DeserializeOwned + JsonSchema + Send + 'static,
    R: Serialize + Send + 'static,
{
    fn name(&self) -> &ToolName {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    async fn handle(&self, arguments: ToolArguments) -> Result<String, ToolError> {
        arguments.resolve_all(&self.parameters)?;
        let args: A = arguments.deserialize()?;
        let result = (self.handler)(args).await?;
        match serde_json::to_value(&result)? {
            Value::String(text) => Ok(text),
            other => Ok(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct Lookup {
        /// City to look up
        city: String,
        days: Option<u32>,
    }

    #[derive(Serialize)]
    struct Forecast {
        city: String,
        days: u32,
    }

    fn forecast_tool() -> TypedTool<Lookup, Forecast> {
        TypedTool::new("forecast", |args: Lookup| async move {
            Ok(Forecast {
                city: args.city,
                days: args.days.unwrap_or(1),
            })
        })
        .unwrap()
    }

    #[test]
    fn test_parameters_derived_from_argument_type() {
        let tool = forecast_tool();
        assert_eq!(
            tool.parameters(),
            &[
                Parameter::string("city").with_description("City to look up"),
                Parameter::integer("days").optional(),
            ]
        );
    }

    #[tokio::test]
    async fn test_result_is_json_encoded() {
        let tool = forecast_tool();
        let output = tool
            .handle(ToolArguments::parse(r#"{"city":"Delft"}"#).unwrap())
            .await
            .unwrap();
        assert_eq!(output, r#"{"city":"Delft","days":1}"#);
    }

    #[tokio::test]
    async fn test_string_result_is_not_quoted() {
        let tool = TypedTool::new("echo", |args: Lookup| async move { Ok(args.city) }).unwrap();
        let output = tool
            .handle(ToolArguments::parse(r#"{"city":"Delft"}"#).unwrap())
            .await
            .unwrap();
        assert_eq!(output, "Delft");
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let tool = forecast_tool();
        let err = tool
            .handle(ToolArguments::parse(r#"{"days":2}"#).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::MissingArgument("city".to_string()));
    }
}
