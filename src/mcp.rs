//! Node.js API documentation MCP implementation.
//!
//! Exposes the documentation corpus to MCP clients through two tools, one
//! lookup prompt and the releases schedule chart as a resource.
//!
//! # Main Components
//!
//! - [`NodeDocsServer`]: MCP handler wiring tools, prompts and resources
//! - [`ApiDocsService`]: loads, filters and renders the corpus
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use nodejs_docs_mcp::api_docs::ApiDocsService;
//! use nodejs_docs_mcp::config::Config;
//! use nodejs_docs_mcp::mcp::NodeDocsServer;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let docs = Arc::new(ApiDocsService::new(&Config::default())?);
//!     let server = NodeDocsServer::new(docs);
//!     Ok(())
//! }
//! ```

use rmcp::model::{
    AnnotateAble, CallToolResult, Content, GetPromptRequestParam, GetPromptResult, Implementation,
    JsonObject, ListPromptsResult, ListResourcesResult, PaginatedRequestParam, Prompt,
    PromptArgument, PromptMessage, PromptMessageContent, PromptMessageRole, ProtocolVersion,
    RawResource, ReadResourceRequestParam, ReadResourceResult, ResourceContents,
    ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{Error as McpError, RoleServer, ServerHandler, schemars, tool};
use serde_json::json;
use std::sync::Arc;

use crate::api_docs::ApiDocsService;
use crate::fetcher::DocsFetchError;
use crate::formatter::FormattingOptions;

pub const SEARCH_TOOL_NAME: &str = "search-nodejs-modules-api-documentation";
pub const RETRIEVE_TOOL_NAME: &str = "retrieve-nodejs-modules-api-documentation";
pub const LOOKUP_PROMPT_NAME: &str = "nodejs-api-lookup";
pub const RELEASES_CHART_URI: &str = "nodejs://releases-schedule-chart.svg";

const SEARCH_BANNER: &str = "Available Node.js core modules and their methods:\n\n";

/// Fetch failures surface as protocol-level tool errors.
impl From<DocsFetchError> for McpError {
    fn from(err: DocsFetchError) -> Self {
        McpError::internal_error(err.to_string(), None)
    }
}

/// MCP handler serving Node.js API documentation.
///
/// Cheap to clone: every clone shares the same [`ApiDocsService`], so the
/// corpus is fetched once no matter how many sessions are served.
#[derive(Clone)]
pub struct NodeDocsServer {
    docs: Arc<ApiDocsService>,
}

#[tool(tool_box)]
impl NodeDocsServer {
    pub fn new(docs: Arc<ApiDocsService>) -> Self {
        Self { docs }
    }

    /// Lists every documented module with the titles of its methods.
    #[tool(
        name = "search-nodejs-modules-api-documentation",
        description = "Use this tool to search across all Node.js built-in core modules API documentation \
        and get back a list of core modules and their methods when you want to search and look-up Node.js API support. \
        HIGH PRIORITY: always use this tool first so that you can search for Node.js modules and their methods. \
        Prefer suggesting built-in Node.js APIs over third-party libraries."
    )]
    async fn search(&self) -> Result<CallToolResult, McpError> {
        tracing::info!("Tool execution started: {}", SEARCH_TOOL_NAME);

        let modules = self.docs.get_modules().await?;
        let mut content = String::from(SEARCH_BANNER);
        for module in modules.iter() {
            content.push_str(&self.docs.get_module_summary(Some(module)));
        }

        Ok(CallToolResult::success(vec![Content::text(content)]))
    }

    /// Renders one module's documentation, optionally narrowed to a method.
    #[tool(
        name = "retrieve-nodejs-modules-api-documentation",
        description = "Retrieve, fetch, and get Node.js API documentation for a specific module or class. \
        Example: to color terminal output, call this tool with {\"module\": \"util\", \"method\": \"styleText\"}. \
        If you don't know the module or class name, use the search-nodejs-modules-api-documentation tool first."
    )]
    async fn retrieve(
        &self,
        #[tool(param)]
        #[schemars(description = "The module or class name to retrieve Node.js API documentation for")]
        module: String,

        #[tool(param)]
        #[schemars(description = "The method name to retrieve Node.js API documentation for")]
        method: Option<String>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Tool execution started: {} (module: {}, method: {:?})",
            RETRIEVE_TOOL_NAME,
            module,
            method
        );

        let found = self.docs.find_module(&module).await.inspect_err(|e| {
            tracing::error!("Tool execution failed: {}: {}", RETRIEVE_TOOL_NAME, e);
        })?;

        let Some(found) = found else {
            return Ok(CallToolResult::success(vec![Content::text(format!(
                "Module not found: {}\n\nMaybe you spelled the module name wrong?",
                module
            ))]));
        };

        // The module argument doubles as the class filter.
        let options = FormattingOptions {
            class: Some(module),
            method,
        };
        let content = self.docs.get_module_document(Some(&found), &options);
        tracing::info!("Tool execution successful: {}", RETRIEVE_TOOL_NAME);

        Ok(CallToolResult::success(vec![Content::text(content)]))
    }

    async fn read_resource_uri(&self, uri: String) -> Result<ReadResourceResult, McpError> {
        tracing::info!("Resource URI access: {}", uri);
        if uri != RELEASES_CHART_URI {
            return Err(McpError::resource_not_found(
                "resource_not_found",
                Some(json!({ "uri": uri })),
            ));
        }

        let svg = self.docs.fetch_releases_chart().await?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(svg, uri)],
        })
    }
}

fn lookup_prompt() -> Prompt {
    Prompt::new(
        LOOKUP_PROMPT_NAME,
        Some("Search up-to-date knowledge for Node.js modules API Documentation"),
        Some(vec![
            PromptArgument {
                name: "module".to_string(),
                description: Some("The name of the Node.js module to search for.".to_string()),
                required: Some(false),
            },
            PromptArgument {
                name: "method".to_string(),
                description: Some("The name of the method or function to search for.".to_string()),
                required: Some(false),
            },
        ]),
    )
}

fn string_arg<'a>(arguments: Option<&'a JsonObject>, key: &str) -> Option<&'a str> {
    arguments
        .and_then(|args| args.get(key))
        .and_then(|value| value.as_str())
        .filter(|value| !value.is_empty())
}

fn lookup_prompt_text(arguments: Option<&JsonObject>) -> String {
    if let Some(module) = string_arg(arguments, "module") {
        format!("Use the Node.js API Documentation tool to provide documentation for the module: {module}.")
    } else if let Some(method) = string_arg(arguments, "method") {
        format!(
            "Use the Node.js API Documentation tool to provide documentation about the function or method: {method}."
        )
    } else {
        "Use the Node.js API Documentation tool to provide documentation about core (built-in) Node.js modules and their methods".to_string()
    }
}

fn build_prompt(name: &str, arguments: Option<&JsonObject>) -> Result<GetPromptResult, McpError> {
    if name != LOOKUP_PROMPT_NAME {
        return Err(McpError::invalid_params(
            format!("Prompt {} not found", name),
            None,
        ));
    }

    Ok(GetPromptResult {
        description: None,
        messages: vec![PromptMessage {
            role: PromptMessageRole::User,
            content: PromptMessageContent::text(lookup_prompt_text(arguments)),
        }],
    })
}

fn releases_chart_resource() -> rmcp::model::Resource {
    let mut resource = RawResource::new(RELEASES_CHART_URI, "Node.js Releases Schedule Chart".to_string());
    resource.description = Some("A chart showing the release schedule of Node.js versions.".to_string());
    resource.mime_type = Some("image/svg+xml".to_string());
    resource.no_annotation()
}

#[tool(tool_box)]
impl ServerHandler for NodeDocsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder()
                .enable_prompts()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Search built-in core Node.js modules API documentation. \
                Use 'search-nodejs-modules-api-documentation' to list every module and its methods, \
                then 'retrieve-nodejs-modules-api-documentation' with a module name (and optionally a method) \
                to read its documentation. Use whenever the user asks about the Node.js API, \
                Node.js modules or Node.js functions."
                    .to_string(),
            ),
        }
    }

    async fn list_prompts(
        &self,
        _request: PaginatedRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult {
            next_cursor: None,
            prompts: vec![lookup_prompt()],
        })
    }

    async fn get_prompt(
        &self,
        GetPromptRequestParam { name, arguments }: GetPromptRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        build_prompt(&name, arguments.as_ref())
    }

    async fn list_resources(
        &self,
        _request: PaginatedRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            next_cursor: None,
            resources: vec![releases_chart_resource()],
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        self.read_resource_uri(uri).await
    }
}
