use std::sync::Arc;

use log::{debug, error, info, warn};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::AppConfig;
use crate::core::list_fetcher::ListQuery;
use crate::core::resource::Resource;
use crate::core::schema::FilterKind;
use crate::core::session_store::SessionStore;
use crate::error::{PortalError, Result};
use crate::http::cache::TagCache;
use crate::http::transport::{
    ApiClient, ApiRequest, ApiTransport, MultipartField, RawResponse, RequestBody,
};
use crate::model::envelope::{ApiOutcome, Envelope, Page, Pagination, first_messages};
use crate::model::login_response::LoginData;
use crate::model::session::Session;
use crate::model::{
    Branch, Course, Division, Enrollment, HeroSection, NewsFeed, Opportunity, Partner, Stats,
    Student,
};
use crate::model::blog::BlogPost;

const VALIDATION_FALLBACK: &str = "The given data was invalid.";
const NOT_FOUND_FALLBACK: &str = "Not found";

/// `(value, label)` pairs offered by a select filter.
pub type Choices = Vec<(String, String)>;

/// Page size used when a whole list feeds a select box.
pub const OPTION_LIST_PER_PAGE: u32 = 100;

/// Everything the public home page shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomePage {
    pub hero_sections: Vec<HeroSection>,
    pub stats: Option<Stats>,
    pub featured_courses: Vec<Course>,
    pub partners: Vec<Partner>,
    pub news: Vec<NewsFeed>,
    pub opportunities: Vec<Opportunity>,
}

/// Remote option lists for the select filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub branches: Vec<Branch>,
    pub divisions: Vec<Division>,
    pub courses: Vec<Course>,
}

impl FilterOptions {
    /// Option lists that come from the API rather than `OptionLists`.
    pub const REMOTE_LISTS: &'static [&'static str] = &["branches", "divisions", "courses"];

    /// `(value, label)` pairs for a select filter backed by a remote list.
    pub fn choices(&self, list: &str) -> Choices {
        match list {
            "branches" => self
                .branches
                .iter()
                .map(|b| (b.id.to_string(), b.name.clone()))
                .collect(),
            "divisions" => self
                .divisions
                .iter()
                .map(|d| (d.id.to_string(), d.name.clone()))
                .collect(),
            "courses" => self
                .courses
                .iter()
                .map(|c| (c.id.to_string(), c.title.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Client for the learning-management API: sessions, cached reads and mutations.
pub struct Portal {
    transport: Arc<dyn ApiTransport>,
    session: SessionStore,
    cache: TagCache,
    config: Arc<AppConfig>,
}

impl Portal {
    pub fn new(config: AppConfig) -> Result<Self> {
        let session = SessionStore::load(&config.session_path);
        let client = ApiClient::new(&config, session.token_fn())?;
        Ok(Self::with_transport(config, Arc::new(client), session))
    }

    pub fn with_transport(
        config: AppConfig,
        transport: Arc<dyn ApiTransport>,
        session: SessionStore,
    ) -> Self {
        Portal {
            cache: TagCache::new(config.cache_ttl),
            config: Arc::new(config),
            transport,
            session,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<ApiOutcome<Session>> {
        let request = ApiRequest::new(Method::POST, "auth/login")
            .with_body(RequestBody::Json(json!({ "email": email, "password": password })))
            .public(true);

        let outcome = self.call(request, &[]).await?;
        let outcome = outcome.try_map(decode::<LoginData>)?.map(LoginData::into_session);
        if let ApiOutcome::Success { data: session, .. } = &outcome {
            self.session.set(session.clone())?;
            self.cache.clear();
            info!("signed in as {}", session.email);
        }
        Ok(outcome)
    }

    /// Best effort on the server side; the local session is always dropped.
    pub async fn logout(&self) -> Result<()> {
        if self.session.current().is_some() {
            let request = ApiRequest::new(Method::POST, "auth/logout");
            if let Err(err) = self.call(request, &[]).await {
                warn!("server-side logout failed: {err}");
            }
        }
        self.cache.clear();
        self.session.clear()
    }

    pub async fn list<R: Resource>(&self, query: &ListQuery) -> Result<ApiOutcome<Page<R>>> {
        self.list_at::<R>(R::ENDPOINT, false, query, &[R::TAG]).await
    }

    pub async fn list_public<R: Resource>(
        &self,
        query: &ListQuery,
    ) -> Result<ApiOutcome<Page<R>>> {
        let endpoint = R::PUBLIC_ENDPOINT
            .ok_or_else(|| PortalError::Config(format!("{} have no public listing", R::LABEL)))?;
        self.list_at::<R>(endpoint, true, query, &[R::TAG]).await
    }

    async fn list_at<R: Resource>(
        &self,
        path: &str,
        public: bool,
        query: &ListQuery,
        tags: &[&str],
    ) -> Result<ApiOutcome<Page<R>>> {
        let request = ApiRequest::get(path)
            .with_query(query.to_pairs())
            .public(public);
        self.call(request, tags).await?.try_map(decode_page::<R>)
    }

    pub async fn get<R: Resource>(&self, id: i64) -> Result<ApiOutcome<R>> {
        let record_tag = record_tag::<R>(id);
        let request = ApiRequest::get(format!("{}/{id}", R::ENDPOINT));
        let outcome = self.call(request, &[R::TAG, record_tag.as_str()]).await?;
        require_data(outcome)?.try_map(decode::<R>)
    }

    pub async fn create<R: Resource>(&self, body: RequestBody) -> Result<ApiOutcome<Option<R>>> {
        let request = ApiRequest::new(Method::POST, R::ENDPOINT).with_body(body);
        self.mutate::<R>(request, None).await
    }

    /// Multipart bodies go out as `POST` with `_method=PUT`.
    pub async fn update<R: Resource>(
        &self,
        id: i64,
        body: RequestBody,
    ) -> Result<ApiOutcome<Option<R>>> {
        let path = format!("{}/{id}", R::ENDPOINT);
        let request = match body {
            RequestBody::Multipart(mut fields) => {
                fields.push(MultipartField::Text {
                    name: "_method".into(),
                    value: "PUT".into(),
                });
                ApiRequest::new(Method::POST, path).with_body(RequestBody::Multipart(fields))
            }
            body => ApiRequest::new(Method::PUT, path).with_body(body),
        };
        self.mutate::<R>(request, Some(id)).await
    }

    pub async fn patch_status<R: Resource>(
        &self,
        id: i64,
        status: &str,
    ) -> Result<ApiOutcome<Option<R>>> {
        let request = ApiRequest::new(Method::PATCH, format!("{}/{id}/status", R::ENDPOINT))
            .with_body(RequestBody::Json(json!({ "status": status })));
        self.mutate::<R>(request, Some(id)).await
    }

    pub async fn delete<R: Resource>(&self, id: i64) -> Result<ApiOutcome<()>> {
        let request = ApiRequest::new(Method::DELETE, format!("{}/{id}", R::ENDPOINT));
        Ok(self.send_mutation::<R>(request, Some(id)).await?.map(|_| ()))
    }

    async fn mutate<R: Resource>(
        &self,
        request: ApiRequest,
        id: Option<i64>,
    ) -> Result<ApiOutcome<Option<R>>> {
        self.send_mutation::<R>(request, id)
            .await?
            .try_map(decode_optional::<R>)
    }

    async fn send_mutation<R: Resource>(
        &self,
        request: ApiRequest,
        id: Option<i64>,
    ) -> Result<ApiOutcome<Value>> {
        let outcome = self.call(request, &[]).await?;
        if let ApiOutcome::Success { .. } = &outcome {
            self.invalidate::<R>(id);
        }
        Ok(outcome)
    }

    fn invalidate<R: Resource>(&self, id: Option<i64>) {
        self.cache.invalidate(R::TAG);
        for tag in R::DEPENDENT_TAGS {
            self.cache.invalidate(tag);
        }
        if let Some(id) = id {
            self.cache.invalidate(&record_tag::<R>(id));
        }
    }

    pub async fn stats(&self) -> Result<ApiOutcome<Stats>> {
        let request = ApiRequest::get("stats").public(true);
        require_data(self.call(request, &["stats", "home"]).await?)?.try_map(decode::<Stats>)
    }

    pub async fn blog_by_slug(&self, slug: &str) -> Result<ApiOutcome<BlogPost>> {
        let request = ApiRequest::get(format!("blogs/{slug}")).public(true);
        require_data(self.call(request, &["blogs"]).await?)?.try_map(decode::<BlogPost>)
    }

    pub async fn my_enrollments(&self, page: u32) -> Result<ApiOutcome<Page<Enrollment>>> {
        let query = ListQuery::new(page, self.config.default_per_page);
        self.list_at::<Enrollment>("student/enrollments", false, &query, &["my-enrollments"])
            .await
    }

    pub async fn profile(&self) -> Result<ApiOutcome<Student>> {
        let request = ApiRequest::get("student/profile");
        require_data(self.call(request, &[]).await?)?.try_map(decode::<Student>)
    }

    /// Sections of the marketing home page, fetched concurrently.
    pub async fn home_page(&self) -> Result<HomePage> {
        let all = ListQuery::new(1, OPTION_LIST_PER_PAGE);
        let featured = ListQuery::new(1, 6).filter("featured", "1");
        let latest = ListQuery::new(1, 3);

        let (hero, stats, courses, partners, news, opportunities) = tokio::try_join!(
            self.list_home::<HeroSection>(&all),
            self.stats(),
            self.list_home::<Course>(&featured),
            self.list_home::<Partner>(&all),
            self.list_home::<NewsFeed>(&latest),
            self.list_home::<Opportunity>(&all),
        )?;

        Ok(HomePage {
            hero_sections: rows_or_empty(hero),
            stats: stats.success(),
            featured_courses: rows_or_empty(courses),
            partners: rows_or_empty(partners),
            news: rows_or_empty(news),
            opportunities: rows_or_empty(opportunities),
        })
    }

    async fn list_home<R: Resource>(&self, query: &ListQuery) -> Result<ApiOutcome<Page<R>>> {
        let endpoint = R::PUBLIC_ENDPOINT.unwrap_or(R::ENDPOINT);
        self.list_at::<R>(endpoint, true, query, &[R::TAG, "home"]).await
    }

    /// Branches, divisions and courses for select filters, fetched concurrently.
    pub async fn filter_options(&self) -> Result<FilterOptions> {
        let all = ListQuery::new(1, OPTION_LIST_PER_PAGE);
        let (branches, divisions, courses) = tokio::try_join!(
            self.list_at::<Branch>(Branch::ENDPOINT, false, &all, &[Branch::TAG, "filter-options"]),
            self.list_at::<Division>(Division::ENDPOINT, false, &all, &[Division::TAG, "filter-options"]),
            self.list_at::<Course>(Course::ENDPOINT, false, &all, &[Course::TAG, "filter-options"]),
        )?;
        Ok(FilterOptions {
            branches: rows_or_empty(branches),
            divisions: rows_or_empty(divisions),
            courses: rows_or_empty(courses),
        })
    }

    /// `(value, label)` pairs for every select filter of `R`, keyed by filter.
    /// Constant lists come from the config; remote ones are fetched only when
    /// one of the filters needs them. Unknown lists resolve to no choices.
    pub async fn filter_choices<R: Resource>(&self) -> Result<Vec<(&'static str, Choices)>> {
        let selects: Vec<(&'static str, &'static str)> = R::filters()
            .iter()
            .filter_map(|field| match field.kind {
                FilterKind::Select(list) => Some((field.key, list)),
                FilterKind::Search => None,
            })
            .collect();

        let needs_remote = selects
            .iter()
            .any(|(_, list)| FilterOptions::REMOTE_LISTS.contains(list));
        let remote = if needs_remote {
            self.filter_options().await?
        } else {
            FilterOptions::default()
        };

        Ok(selects
            .into_iter()
            .map(|(key, list)| {
                let choices = match self.config.options.get(list) {
                    Some(values) => values
                        .iter()
                        .map(|v| (v.to_string(), v.to_string()))
                        .collect(),
                    None => remote.choices(list),
                };
                (key, choices)
            })
            .collect())
    }

    async fn call(&self, request: ApiRequest, tags: &[&str]) -> Result<ApiOutcome<Value>> {
        if !request.public {
            self.session.token()?;
        }

        let cacheable = request.method == Method::GET && !tags.is_empty();
        let key = request.cache_key();
        if cacheable {
            if let Some(raw) = self.cache.get(&key) {
                debug!("cache hit: {key}");
                return self.interpret(raw);
            }
        }

        let stamp = self.cache.stamp(tags);
        let label = format!("{} {}", request.method, request.path);
        let raw = self.transport.execute(request).await.map_err(|err| {
            error!("{label} failed: {err}");
            err
        })?;

        if cacheable && raw.is_success() {
            self.cache.put(key, tags, stamp, raw.clone());
        }

        self.interpret(raw).inspect_err(|err| error!("{label}: {err}"))
    }

    fn interpret(&self, raw: RawResponse) -> Result<ApiOutcome<Value>> {
        let outcome = interpret(raw);
        if let Err(PortalError::Unauthenticated) = &outcome {
            if let Err(err) = self.session.clear() {
                warn!("could not drop expired session: {err}");
            }
        }
        outcome
    }
}

/// Maps status + envelope onto an outcome; only transport-level
/// failures and unexpected statuses become errors.
pub fn interpret(raw: RawResponse) -> Result<ApiOutcome<Value>> {
    let is_success = raw.is_success();
    let envelope = match raw.body {
        body @ Value::Object(_) => serde_json::from_value::<Envelope>(body.clone())
            .unwrap_or_else(|err| {
                debug!("body is not an envelope: {err}");
                Envelope {
                    data: body,
                    ..Envelope::default()
                }
            }),
        body => Envelope {
            data: body,
            ..Envelope::default()
        },
    };
    let errors = envelope
        .errors
        .as_ref()
        .map(first_messages)
        .unwrap_or_default();

    match raw.status {
        401 => Err(PortalError::Unauthenticated),
        404 => Ok(ApiOutcome::NotFound {
            message: envelope
                .message
                .unwrap_or_else(|| NOT_FOUND_FALLBACK.to_string()),
        }),
        _ if is_success && envelope.success != Some(false) => Ok(ApiOutcome::Success {
            data: envelope.data,
            message: envelope.message,
        }),
        status if is_success || status == 422 || !errors.is_empty() => Ok(ApiOutcome::Failure {
            message: envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| VALIDATION_FALLBACK.to_string()),
            errors,
        }),
        status => {
            let code = envelope.code_string();
            Err(PortalError::api(status, code, envelope.message))
        }
    }
}

fn record_tag<R: Resource>(id: i64) -> String {
    format!("{}:{id}", R::TAG)
}

fn decode<T: DeserializeOwned>(data: Value) -> Result<T> {
    Ok(serde_json::from_value(data)?)
}

fn decode_optional<T: DeserializeOwned>(data: Value) -> Result<Option<T>> {
    match data {
        Value::Null => Ok(None),
        Value::Array(ref items) if items.is_empty() => Ok(None),
        data => Ok(Some(serde_json::from_value(data)?)),
    }
}

/// A success without a body is treated as not found.
fn require_data(outcome: ApiOutcome<Value>) -> Result<ApiOutcome<Value>> {
    Ok(match outcome {
        ApiOutcome::Success {
            data: Value::Null,
            message,
        } => ApiOutcome::NotFound {
            message: message.unwrap_or_else(|| NOT_FOUND_FALLBACK.to_string()),
        },
        other => other,
    })
}

/// Accepts `{ <list key>: [...], pagination }` or a bare array.
pub fn decode_page<R: Resource>(data: Value) -> Result<Page<R>> {
    let (rows, pagination) = match data {
        Value::Array(_) => (data, None),
        Value::Object(mut map) => {
            let rows = map.remove(R::LIST_KEY).unwrap_or(Value::Null);
            let pagination = map.remove("pagination").filter(|p| !p.is_null());
            (rows, pagination)
        }
        _ => (Value::Null, None),
    };

    let rows: Vec<R> = match rows {
        Value::Null => Vec::new(),
        rows => serde_json::from_value(rows)?,
    };
    let pagination = match pagination {
        Some(value) => serde_json::from_value::<Pagination>(value)?,
        None => Pagination::single_page(rows.len()),
    };
    Ok(Page { rows, pagination })
}

fn rows_or_empty<R>(outcome: ApiOutcome<Page<R>>) -> Vec<R> {
    outcome.success().map(|page| page.rows).unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::schema::FileUpload;
    use crate::error::portal::GENERIC_FAILURE_MESSAGE;
    use crate::http::fake::FakeTransport;
    use crate::model::Branch;
    use chrono::{Duration, Utc};

    pub(crate) fn test_config() -> AppConfig {
        AppConfig::from_lookup(|key| match key {
            "API_BASE_URL" => Some("https://api.test/api/v1".to_string()),
            _ => None,
        })
        .unwrap()
    }

    pub(crate) fn signed_in() -> Option<Session> {
        Some(Session {
            name: "Admin".into(),
            email: "admin@example.com".into(),
            role: Some("admin".into()),
            token: "secret".into(),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        })
    }

    pub(crate) fn portal_with(transport: Arc<FakeTransport>, session: Option<Session>) -> Portal {
        Portal::with_transport(test_config(), transport, SessionStore::in_memory(session))
    }

    fn branches_body(names: &[&str]) -> Value {
        let rows: Vec<Value> = names
            .iter()
            .enumerate()
            .map(|(i, name)| json!({ "id": i + 1, "name": name, "is_active": true }))
            .collect();
        json!({
            "success": true,
            "message": "Branches retrieved",
            "code": 200,
            "data": { "branches": rows, "pagination": { "current_page": 1, "per_page": 10, "total": rows.len(), "last_page": 1 } }
        })
    }

    #[test]
    fn interpret_maps_statuses_onto_outcomes() {
        let raw = |status, body| RawResponse { status, body };

        assert!(matches!(
            interpret(raw(200, json!({ "success": true, "data": { "id": 1 } }))),
            Ok(ApiOutcome::Success { .. })
        ));
        assert!(matches!(
            interpret(raw(404, Value::Null)),
            Ok(ApiOutcome::NotFound { .. })
        ));
        assert!(matches!(
            interpret(raw(401, json!({ "message": "Token expired" }))),
            Err(PortalError::Unauthenticated)
        ));

        let outcome = interpret(raw(
            422,
            json!({ "success": false, "message": "Invalid", "errors": { "title": ["Title is required"] } }),
        ))
        .unwrap();
        let ApiOutcome::Failure { message, errors } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(message, "Invalid");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["title"], "Title is required");

        let err = interpret(raw(502, Value::String("<html>Bad gateway</html>".into()))).unwrap_err();
        assert_eq!(err.status(), Some(502));

        let err = interpret(raw(500, Value::Null)).unwrap_err();
        assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn success_flag_false_on_2xx_is_a_failure() {
        let outcome = interpret(RawResponse {
            status: 200,
            body: json!({ "success": false, "message": "Coupon expired" }),
        })
        .unwrap();
        assert_eq!(
            outcome,
            ApiOutcome::Failure {
                message: "Coupon expired".into(),
                errors: Default::default()
            }
        );
    }

    #[test]
    fn upstream_error_code_is_preserved() {
        let err = interpret(RawResponse {
            status: 409,
            body: json!({ "success": false, "message": "Already enrolled", "code": "ENROLLED" }),
        })
        .unwrap_err();
        match err {
            PortalError::Api { status, code, message } => {
                assert_eq!(status, 409);
                assert_eq!(code.as_deref(), Some("ENROLLED"));
                assert_eq!(message, "Already enrolled");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decode_page_accepts_bare_arrays() {
        let page = decode_page::<Branch>(json!([{ "id": 1, "name": "Dhaka" }])).unwrap();
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.pagination, Pagination::single_page(1));

        let empty = decode_page::<Branch>(json!({ "pagination": null })).unwrap();
        assert!(empty.rows.is_empty());
    }

    #[tokio::test]
    async fn authenticated_calls_need_a_session() {
        let transport = Arc::new(FakeTransport::new());
        let portal = portal_with(Arc::clone(&transport), None);

        let err = portal
            .list::<Branch>(&ListQuery::new(1, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Unauthenticated));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn unauthorized_response_drops_the_session() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond("GET", "admin/branches", 401, json!({ "message": "Unauthenticated." }));
        let portal = portal_with(transport, signed_in());

        let err = portal.list::<Branch>(&ListQuery::new(1, 10)).await.unwrap_err();
        assert!(matches!(err, PortalError::Unauthenticated));
        assert!(portal.session().current().is_none());
    }

    #[tokio::test]
    async fn reads_are_cached_until_a_mutation_invalidates_the_tag() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond("GET", "admin/branches", 200, branches_body(&["Dhaka"]));
        transport.respond("GET", "admin/branches", 200, branches_body(&["Dhaka", "Sylhet"]));
        transport.respond(
            "POST",
            "admin/branches",
            201,
            json!({ "success": true, "message": "Branch created", "data": { "id": 2, "name": "Sylhet" } }),
        );
        let portal = portal_with(Arc::clone(&transport), signed_in());
        let query = ListQuery::new(1, 10);

        let first = portal.list::<Branch>(&query).await.unwrap().success().unwrap();
        let again = portal.list::<Branch>(&query).await.unwrap().success().unwrap();
        assert_eq!(first.rows.len(), 1);
        assert_eq!(again.rows.len(), 1);
        assert_eq!(transport.count("GET", "admin/branches"), 1);

        let created = portal
            .create::<Branch>(RequestBody::Json(json!({ "name": "Sylhet" })))
            .await
            .unwrap();
        assert!(matches!(created, ApiOutcome::Success { data: Some(_), .. }));

        let fresh = portal.list::<Branch>(&query).await.unwrap().success().unwrap();
        assert_eq!(fresh.rows.len(), 2);
        assert_eq!(transport.count("GET", "admin/branches"), 2);
    }

    #[tokio::test]
    async fn failed_mutation_keeps_the_cache() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond("GET", "admin/branches", 200, branches_body(&["Dhaka"]));
        transport.respond(
            "POST",
            "admin/branches",
            422,
            json!({ "success": false, "errors": { "name": "Name is required" } }),
        );
        let portal = portal_with(Arc::clone(&transport), signed_in());
        let query = ListQuery::new(1, 10);

        portal.list::<Branch>(&query).await.unwrap();
        let outcome = portal
            .create::<Branch>(RequestBody::Json(json!({})))
            .await
            .unwrap();
        assert!(matches!(outcome, ApiOutcome::Failure { .. }));
        portal.list::<Branch>(&query).await.unwrap();
        assert_eq!(transport.count("GET", "admin/branches"), 1);
    }

    #[tokio::test]
    async fn multipart_update_is_spoofed_as_post() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(
            "POST",
            "admin/courses/7",
            200,
            json!({ "success": true, "data": { "id": 7, "title": "Rust" } }),
        );
        let portal = portal_with(Arc::clone(&transport), signed_in());

        let body = RequestBody::Multipart(vec![MultipartField::File {
            name: "thumbnail".into(),
            upload: FileUpload {
                file_name: "cover.png".into(),
                mime: "image/png".into(),
                bytes: vec![137, 80, 78, 71],
            },
        }]);
        let outcome = portal.update::<Course>(7, body).await.unwrap();
        assert!(matches!(outcome, ApiOutcome::Success { data: Some(_), .. }));

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::POST);
        let RequestBody::Multipart(fields) = &sent.body else {
            panic!("expected multipart body");
        };
        assert!(fields.contains(&MultipartField::Text {
            name: "_method".into(),
            value: "PUT".into()
        }));
    }

    #[tokio::test]
    async fn json_update_uses_put_and_delete_tolerates_empty_data() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond("PUT", "admin/branches/3", 200, json!({ "success": true, "data": null }));
        transport.respond("DELETE", "admin/branches/3", 200, json!({ "success": true, "message": "Deleted", "data": [] }));
        let portal = portal_with(Arc::clone(&transport), signed_in());

        let updated = portal
            .update::<Branch>(3, RequestBody::Json(json!({ "name": "Khulna" })))
            .await
            .unwrap();
        assert!(matches!(updated, ApiOutcome::Success { data: None, .. }));

        let deleted = portal.delete::<Branch>(3).await.unwrap();
        assert_eq!(
            deleted,
            ApiOutcome::Success {
                data: (),
                message: Some("Deleted".into())
            }
        );
    }

    #[tokio::test]
    async fn get_without_data_is_not_found() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond("GET", "admin/branches/9", 200, json!({ "success": true, "data": null }));
        let portal = portal_with(transport, signed_in());

        let outcome = portal.get::<Branch>(9).await.unwrap();
        assert!(matches!(outcome, ApiOutcome::NotFound { .. }));
    }

    #[tokio::test]
    async fn login_stores_the_session() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(
            "POST",
            "auth/login",
            200,
            json!({ "success": true, "data": {
                "token": "fresh", "expires_in": 600,
                "user": { "id": 1, "name": "Admin", "email": "admin@example.com", "role": "admin" }
            } }),
        );
        let portal = portal_with(Arc::clone(&transport), None);

        let outcome = portal.login("admin@example.com", "pw").await.unwrap();
        assert!(matches!(outcome, ApiOutcome::Success { .. }));
        assert_eq!(portal.session().token().unwrap(), "fresh");
        assert!(transport.requests()[0].public);
    }

    #[tokio::test]
    async fn wrong_credentials_are_a_failure_not_an_error() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(
            "POST",
            "auth/login",
            422,
            json!({ "success": false, "message": "Invalid credentials", "errors": { "email": ["These credentials do not match our records."] } }),
        );
        let portal = portal_with(transport, None);

        let outcome = portal.login("x@example.com", "bad").await.unwrap();
        let ApiOutcome::Failure { errors, .. } = outcome else {
            panic!("expected failure");
        };
        assert!(errors.contains_key("email"));
        assert!(portal.session().current().is_none());
    }

    #[tokio::test]
    async fn home_page_collects_sections_and_tolerates_missing_ones() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(
            "GET",
            "hero-sections",
            200,
            json!({ "success": true, "data": { "hero_sections": [{ "id": 1, "title": "Learn Rust" }] } }),
        );
        transport.respond(
            "GET",
            "stats",
            200,
            json!({ "success": true, "data": { "students": 1200, "courses": 35 } }),
        );
        transport.respond(
            "GET",
            "courses",
            200,
            json!({ "success": true, "data": { "courses": [{ "id": 3, "title": "Systems" }] } }),
        );
        let portal = portal_with(Arc::clone(&transport), None);

        let home = portal.home_page().await.unwrap();
        assert_eq!(home.hero_sections.len(), 1);
        assert_eq!(home.stats.as_ref().map(|s| s.students), Some(1200));
        assert_eq!(home.featured_courses[0].title, "Systems");
        assert!(home.partners.is_empty());
        assert!(home.news.is_empty());
        assert!(transport.requests().iter().all(|r| r.public));

        let featured = transport
            .requests()
            .into_iter()
            .find(|r| r.path == "courses")
            .unwrap();
        assert!(featured.query.contains(&("featured".to_string(), "1".to_string())));
    }

    #[tokio::test]
    async fn filter_options_fail_together() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond("GET", "admin/branches", 200, branches_body(&["Dhaka"]));
        transport.respond("GET", "admin/divisions", 200, json!({ "success": true, "data": { "divisions": [] } }));
        transport.fail("GET", "admin/courses");
        let portal = portal_with(transport, signed_in());

        assert!(portal.filter_options().await.is_err());
    }

    #[tokio::test]
    async fn filter_options_expose_select_choices() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond("GET", "admin/branches", 200, branches_body(&["Dhaka", "Sylhet"]));
        transport.respond("GET", "admin/divisions", 200, json!({ "success": true, "data": { "divisions": [{ "id": 5, "name": "Chattogram" }] } }));
        transport.respond("GET", "admin/courses", 200, json!({ "success": true, "data": { "courses": [] } }));
        let portal = portal_with(transport, signed_in());

        let options = portal.filter_options().await.unwrap();
        assert_eq!(
            options.choices("branches"),
            vec![("1".to_string(), "Dhaka".to_string()), ("2".to_string(), "Sylhet".to_string())]
        );
        assert_eq!(options.choices("divisions")[0].1, "Chattogram");
        assert!(options.choices("courses").is_empty());
    }

    #[tokio::test]
    async fn public_listing_needs_a_public_endpoint() {
        let transport = Arc::new(FakeTransport::new());
        let portal = portal_with(transport, None);
        let err = portal
            .list_public::<crate::model::Coupon>(&ListQuery::new(1, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Config(_)));
    }

    #[tokio::test]
    async fn student_dashboard_reads_own_enrollments() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(
            "GET",
            "student/enrollments",
            200,
            json!({ "success": true, "data": { "enrollments": [{ "id": 1, "course": { "id": 3, "title": "Systems" }, "status": "approved" }] } }),
        );
        transport.respond(
            "GET",
            "student/profile",
            200,
            json!({ "success": true, "data": { "id": 9, "name": "Tania", "email": "tania@example.com" } }),
        );
        let portal = portal_with(transport, signed_in());

        let page = portal.my_enrollments(1).await.unwrap().success().unwrap();
        assert_eq!(page.rows[0].course.as_ref().unwrap().name, "Systems");
        let profile = portal.profile().await.unwrap().success().unwrap();
        assert_eq!(profile.name, "Tania");
    }

    #[tokio::test]
    async fn list_read_in_flight_during_a_write_is_not_cached() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond("GET", "admin/branches", 200, branches_body(&["Dhaka"]));
        transport.respond("GET", "admin/branches", 200, branches_body(&["Dhaka", "Sylhet"]));
        transport.respond(
            "POST",
            "admin/branches",
            201,
            json!({ "success": true, "data": { "id": 2, "name": "Sylhet" } }),
        );
        let hold = transport.hold("GET", "admin/branches");
        let portal = portal_with(Arc::clone(&transport), signed_in());
        let query = ListQuery::new(1, 10);

        let read = portal.list::<Branch>(&query);
        let write = async {
            while transport.count("GET", "admin/branches") == 0 {
                tokio::task::yield_now().await;
            }
            let created = portal
                .create::<Branch>(RequestBody::Json(json!({ "name": "Sylhet" })))
                .await
                .unwrap();
            hold.add_permits(10);
            created
        };
        let (read, created) = tokio::join!(read, write);
        assert_eq!(read.unwrap().success().unwrap().rows.len(), 1);
        assert!(matches!(created, ApiOutcome::Success { .. }));

        let fresh = portal.list::<Branch>(&query).await.unwrap().success().unwrap();
        assert_eq!(fresh.rows.len(), 2);
        assert_eq!(transport.count("GET", "admin/branches"), 2);
    }

    #[tokio::test]
    async fn status_change_patches_and_invalidates_dependents() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(
            "GET",
            "admin/enrollments",
            200,
            json!({ "success": true, "data": { "enrollments": [{ "id": 4, "status": "pending" }] } }),
        );
        transport.respond("GET", "stats", 200, json!({ "success": true, "data": { "students": 10 } }));
        transport.respond(
            "GET",
            "student/enrollments",
            200,
            json!({ "success": true, "data": { "enrollments": [] } }),
        );
        transport.respond(
            "PATCH",
            "admin/enrollments/4/status",
            200,
            json!({ "success": true, "message": "Status updated", "data": { "id": 4, "status": "approved" } }),
        );
        let portal = portal_with(Arc::clone(&transport), signed_in());
        let query = ListQuery::new(1, 10);

        for _ in 0..2 {
            portal.list::<Enrollment>(&query).await.unwrap();
            portal.stats().await.unwrap();
            portal.my_enrollments(1).await.unwrap();
        }
        assert_eq!(transport.count("GET", "admin/enrollments"), 1);

        let outcome = portal
            .patch_status::<Enrollment>(4, "approved")
            .await
            .unwrap();
        let ApiOutcome::Success { data: Some(enrollment), .. } = outcome else {
            panic!("expected the updated enrollment");
        };
        assert_eq!(enrollment.status.as_deref(), Some("approved"));

        let sent = transport
            .requests()
            .into_iter()
            .find(|r| r.method == Method::PATCH)
            .unwrap();
        assert_eq!(sent.path, "admin/enrollments/4/status");
        assert_eq!(sent.body, RequestBody::Json(json!({ "status": "approved" })));

        portal.list::<Enrollment>(&query).await.unwrap();
        portal.stats().await.unwrap();
        portal.my_enrollments(1).await.unwrap();
        assert_eq!(transport.count("GET", "admin/enrollments"), 2);
        assert_eq!(transport.count("GET", "stats"), 2);
        assert_eq!(transport.count("GET", "student/enrollments"), 2);
    }

    #[tokio::test]
    async fn blog_by_slug_is_public_and_404_is_not_found() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(
            "GET",
            "blogs/ownership",
            200,
            json!({ "success": true, "data": { "id": 1, "title": "Ownership explained", "slug": "ownership" } }),
        );
        transport.respond(
            "GET",
            "blogs/missing",
            404,
            json!({ "success": false, "message": "Blog not found" }),
        );
        let portal = portal_with(Arc::clone(&transport), None);

        let post = portal.blog_by_slug("ownership").await.unwrap().success().unwrap();
        assert_eq!(post.title, "Ownership explained");
        assert!(transport.requests()[0].public);

        let missing = portal.blog_by_slug("missing").await.unwrap();
        assert_eq!(
            missing,
            ApiOutcome::NotFound {
                message: "Blog not found".into()
            }
        );
    }

    #[tokio::test]
    async fn bare_array_body_lists_as_a_single_page() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(
            "GET",
            "admin/branches",
            200,
            json!([{ "id": 1, "name": "Dhaka" }, { "id": 2, "name": "Sylhet" }]),
        );
        let portal = portal_with(transport, signed_in());

        let page = portal
            .list::<Branch>(&ListQuery::new(1, 10))
            .await
            .unwrap()
            .success()
            .unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.pagination, Pagination::single_page(2));
    }

    #[tokio::test]
    async fn filter_choices_mix_constant_and_remote_lists() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond("GET", "admin/branches", 200, branches_body(&["Dhaka"]));
        transport.respond("GET", "admin/divisions", 200, json!({ "success": true, "data": { "divisions": [] } }));
        transport.respond(
            "GET",
            "admin/courses",
            200,
            json!({ "success": true, "data": { "courses": [{ "id": 3, "title": "Systems" }] } }),
        );
        let portal = portal_with(Arc::clone(&transport), signed_in());

        let choices = portal.filter_choices::<Enrollment>().await.unwrap();
        let of = |key: &str| {
            choices
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, c)| c.clone())
                .unwrap()
        };
        assert!(choices.iter().all(|(k, _)| *k != "search"));
        assert_eq!(of("sort_order")[1], ("desc".to_string(), "desc".to_string()));
        assert_eq!(of("status")[0].0, "pending");
        assert_eq!(of("branch_id"), vec![("1".to_string(), "Dhaka".to_string())]);
        assert_eq!(of("course_id"), vec![("3".to_string(), "Systems".to_string())]);
    }

    #[tokio::test]
    async fn constant_filter_choices_need_no_requests() {
        let transport = Arc::new(FakeTransport::new());
        let portal = portal_with(Arc::clone(&transport), signed_in());

        let choices = portal.filter_choices::<crate::model::Coupon>().await.unwrap();
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].0, "sort_order");
        assert!(transport.requests().is_empty());
    }
}
