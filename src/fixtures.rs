#[cfg(test)]
pub mod test {
    /// iOS-only spec. `variants` is the last block so tests can append entries.
    pub const IOS_SPEC: &str = r#"ios:
  xcodeproj: Acme.xcodeproj
  targets:
    AcmeApp:
      app_name: Acme
      bundle_id: com.acme.app
      test_target: AcmeAppTests
      source:
        path: Sources
        info: Sources/Info.plist
        config: Sources/Config
  signing:
    team_name: Acme
    team_id: T123
    export_method: appstore
  custom:
    - name: API_HOST
      value: api.acme.com
      destination: project
    - name: API_KEY
      value: "{{ envVars.ACME_API_KEY }}"
      destination: fastlane
  post_switch_script: echo switched
  variants:
    default:
      version_name: "1.0.0"
      version_number: 1
    beta:
      id_suffix: beta
      version_name: "1.1.0"
      version_number: 12
      store_destination: TestFlight
      custom:
        - name: API_HOST
          value: beta.acme.com
        - name: LOG_LEVEL
          value: debug
          destination: envVar
    staging:
      bundle_id: com.acme.staging
      version_name: "1.1.0"
      version_number: 13
      release_signing:
        export_method: enterprise
        match_url: git@github.com:acme/certs.git
      post_switch_script: pod install"#;

    pub const ANDROID_SPEC: &str = r#"android:
  path: app
  app_name: Acme
  app_identifier: com.acme.android
  signing:
    key_alias: upload
    key_password: "{{ envVars.KEY_PASSWORD }}"
    store_file: keystore.jks
    store_password: "{{ envVars.STORE_PASSWORD }}"
  custom:
    - name: SENTRY_DSN
      value: SENTRY_DSN
      env: true
      destination: envVar
  variants:
    default:
      version_name: "1.0.0"
      version_code: 1
    qa:
      id_suffix: qa
      version_name: "1.0.1"
      version_code: 42
      store_destination: firebase
      custom:
        - name: API_HOST
          value: qa.acme.com
          destination: gradle"#;

    pub const FULL_SPEC: &str = r#"ios:
  targets:
    AcmeApp:
      app_name: Acme
      bundle_id: com.acme.app
  signing:
    team_name: Acme
    team_id: T123
    export_method: appstore
  variants:
    default:
      version_name: "1.0.0"
      version_number: 1
    beta:
      id_suffix: beta
      version_name: "1.1.0"
      version_number: 2
android:
  app_name: Acme
  app_identifier: com.acme.android
  signing:
    key_alias: upload
    key_password: secret
    store_file: keystore.jks
    store_password: secret
  variants:
    default:
      version_name: "1.0.0"
      version_code: 1
    beta:
      id_suffix: beta
      version_name: "1.1.0"
      version_code: 2"#;
}
